#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

//! # Inpainting Service Client
//!
//! A client for the theinpaint.com web editor. It uploads an image, finds the
//! uploaded image in the caller's image list by name, and submits a PNG mask
//! that tells the service which parts to inpaint.
//!
//! ## Features
//!
//! - **Upload**: multipart `POST /upload` with the browser-like headers the service expects
//! - **Lookup**: `GET /user/info/` and a first-match scan by `fileName`
//! - **Process**: mask submitted as a percent-encoded PNG data URI
//! - **Masks**: draw green regions and red strokes on a transparent canvas
//! - **Sessions**: reuse a `connect.sid` cookie or pick up the one the service issues
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inpaint_client::{ClientConfig, InpaintClient, InpaintWorkflow, NoOpStepReporter, WorkflowRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = InpaintClient::new(&ClientConfig::default())?;
//! let request = WorkflowRequest::from_paths("animal_image.png", "mask.png", None, None, None).await?;
//!
//! let mut workflow = InpaintWorkflow::new(client, Box::new(NoOpStepReporter));
//! let report = workflow.run(&request).await?;
//! println!("processed {} with status {}", report.target.id, report.process_status);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, spinner and tracing subscriber setup
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! inpaint-client = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod encoding;
pub mod endpoints;
pub mod error;
pub mod mask;
pub mod models;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod workflow;

use std::path::Path;

// Public API exports
pub use client::{ImageListing, InpaintClient, UploadOutcome, UPLOAD_FIELD};
pub use config::{ClientConfig, ClientConfigBuilder, SiteUrls};
pub use encoding::{from_data_uri, mask_form_body, percent_encode_component, to_data_uri};
pub use endpoints::Endpoint;
pub use error::{InpaintError, Result};
pub use mask::MaskBuilder;
pub use models::{find_by_file_name, EditorTarget, ImageRecord, SessionCredential};
pub use services::{
    infer_media_type, JsonLinesReporter, LocalFiles, NoOpStepReporter, StepReport, StepReporter,
    StepTracker, UploadFile, WorkflowStep,
};
pub use workflow::{InpaintWorkflow, WorkflowReport, WorkflowRequest};

#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat};

/// Run the full workflow for an image and mask on disk
///
/// The image is uploaded under its file stem. Nothing is printed; use
/// [`InpaintWorkflow`] with a [`StepReporter`] to observe each step.
///
/// # Examples
///
/// ```rust,no_run
/// use inpaint_client::{inpaint_file, ClientConfig, SessionCredential};
///
/// # async fn example() -> anyhow::Result<()> {
/// let session = SessionCredential::parse("s%3Aabc.def")?;
/// let report = inpaint_file("animal_image.png", "mask.png", &ClientConfig::default(), Some(session)).await?;
/// assert_eq!(report.record.file_name(), Some("animal_image"));
/// # Ok(())
/// # }
/// ```
pub async fn inpaint_file<P: AsRef<Path>, Q: AsRef<Path>>(
    image_path: P,
    mask_path: Q,
    config: &ClientConfig,
    session: Option<SessionCredential>,
) -> Result<WorkflowReport> {
    let client = InpaintClient::new(config)?;
    let request = WorkflowRequest::from_paths(image_path, mask_path, None, None, session).await?;
    let mut workflow = InpaintWorkflow::new(client, Box::new(NoOpStepReporter));
    let report = workflow.run(&request).await?;
    Ok(report)
}
