//! The upload → lookup → process workflow
//!
//! Strictly sequential: every step waits for the previous response. There
//! are no retries and nothing is rolled back; a failed process step leaves
//! the uploaded image on the service until its own retention removes it.

use crate::client::{InpaintClient, UploadOutcome};
use crate::error::{InpaintError, Result};
use crate::mask::ensure_same_dimensions;
use crate::models::{find_by_file_name, EditorTarget, ImageRecord, SessionCredential};
use crate::services::{LocalFiles, StepReporter, StepTracker, UploadFile, WorkflowStep};
use std::path::Path;
use image::ImageError;
use tracing::{debug, info, instrument, warn};

/// Inputs of one workflow run
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub source: UploadFile,
    /// PNG bytes of the mask
    pub mask_png: Vec<u8>,
    /// Credential for all three calls; when absent, the one issued by the
    /// upload response is used for the later calls
    pub session: Option<SessionCredential>,
}

impl WorkflowRequest {
    /// Read the source image and mask from disk
    pub async fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        image_path: P,
        mask_path: Q,
        remote_name: Option<&str>,
        media_type: Option<&str>,
        session: Option<SessionCredential>,
    ) -> Result<Self> {
        let source = UploadFile::from_path(image_path, remote_name, media_type).await?;
        let mask_png = LocalFiles::read(mask_path).await?;
        Ok(Self {
            source,
            mask_png,
            session,
        })
    }
}

/// What each step returned
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowReport {
    pub upload: UploadOutcome,
    pub info_status: u16,
    /// The record matched by name
    pub record: ImageRecord,
    pub target: EditorTarget,
    pub process_status: u16,
}

/// Runs the three calls in order and reports each outcome
pub struct InpaintWorkflow {
    client: InpaintClient,
    tracker: StepTracker,
}

impl InpaintWorkflow {
    #[must_use]
    pub fn new(client: InpaintClient, reporter: Box<dyn StepReporter>) -> Self {
        Self {
            client,
            tracker: StepTracker::new(reporter),
        }
    }

    #[must_use]
    pub fn client(&self) -> &InpaintClient {
        &self.client
    }

    /// Upload, look up and process
    ///
    /// # Errors
    /// - Transport failures on any call
    /// - Info response without an `images` list
    /// - No record named after the upload ([`InpaintError::RecordNotFound`]);
    ///   the process request is never built in that case
    #[instrument(skip(self, request), fields(file_name = %request.source.base_name))]
    pub async fn run(&mut self, request: &WorkflowRequest) -> Result<WorkflowReport> {
        check_mask_fits(request);

        self.tracker.start(WorkflowStep::Upload);
        let uploaded = self
            .client
            .upload(&request.source, request.session.as_ref())
            .await;
        let upload = self.track(uploaded)?;
        self.tracker.finish(Some(upload.status), None);

        let session = request
            .session
            .clone()
            .or_else(|| upload.issued_session.clone());
        if request.session.is_none() && session.is_some() {
            info!("Using session issued by the upload response");
        }

        self.tracker.start(WorkflowStep::Info);
        let fetched = self.client.fetch_listing(session.as_ref()).await;
        let listing = self.track(fetched)?;
        self.tracker.finish(Some(listing.status), None);

        self.tracker.start(WorkflowStep::Lookup);
        let found = find_by_file_name(&listing.records, &request.source.base_name).cloned();
        let found_json = found.as_ref().map(serde_json::to_value).transpose();
        let found_json = self.track(found_json.map_err(|e| {
            InpaintError::encoding(format!("Cannot report matched record: {}", e))
        }))?;
        self.tracker.finish(None, found_json);

        let record = found.ok_or_else(|| InpaintError::record_not_found(&request.source.base_name))?;
        let target = EditorTarget::from_record(&record)?;

        self.tracker.start(WorkflowStep::Process);
        let processed = self
            .client
            .process(&target, session.as_ref(), &request.mask_png)
            .await;
        let process_status = self.track(processed)?;
        self.tracker.finish(Some(process_status), None);

        Ok(WorkflowReport {
            upload,
            info_status: listing.status,
            record,
            target,
            process_status,
        })
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.tracker.fail(&e.to_string());
        }
        result
    }
}

/// Warn when the mask and image sizes differ; the service has the final say
fn check_mask_fits(request: &WorkflowRequest) {
    match ensure_same_dimensions(&request.mask_png, &request.source.bytes) {
        Ok(()) => {},
        Err(InpaintError::Image(ImageError::Unsupported(e))) => {
            debug!("Skipping mask size check: {}", e);
        },
        Err(e) => warn!("Mask may not fit the image: {}", e),
    }
}
