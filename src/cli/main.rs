//! Inpainting service CLI
//!
//! Command-line interface for uploading an image, looking it up and
//! submitting a mask to the inpainting service.

use super::config::{parse_region, parse_stroke, CliConfigBuilder, RegionArg, StrokeArg};
use super::progress::CliStepReporter;
use crate::{
    client::InpaintClient,
    config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT},
    mask::MaskBuilder,
    models::{find_by_file_name, EditorTarget, SessionCredential},
    services::{LocalFiles, StepTracker, UploadFile, WorkflowStep},
    tracing_config::{TracingConfig, TracingFormat},
    workflow::{InpaintWorkflow, WorkflowRequest},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inpainting service client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "inpaint-client")]
pub struct Cli {
    /// Session cookie value (`connect.sid`), bare or as `connect.sid=<value>`
    #[arg(long, env = "INPAINT_SESSION", hide_env_values = true, global = true)]
    pub session: Option<String>,

    /// Root URL of the service
    #[arg(long, env = "INPAINT_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable the spinner shown while requests are in flight
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload an image, find it in the image list and submit a mask for it
    Run {
        /// Local image to upload
        image: PathBuf,
        /// Mask PNG with the same dimensions as the image
        mask: PathBuf,
        /// Name to upload under [default: file stem of IMAGE]
        #[arg(long)]
        name: Option<String>,
        /// Declared media type [default: inferred from extension]
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Upload an image only
    Upload {
        image: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Print the images stored for the session
    List {
        /// Only print the first image uploaded under this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Submit a mask for an image addressed by id and secret
    Process {
        #[arg(long)]
        id: String,
        #[arg(long)]
        secret: String,
        mask: PathBuf,
    },

    /// Draw a mask PNG: green regions, then red strokes, over transparency
    MakeMask {
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
        /// Image whose dimensions the mask must match
        #[arg(long, required_unless_present_all = ["width", "height"])]
        reference: Option<PathBuf>,
        #[arg(long, requires = "height", conflicts_with = "reference")]
        width: Option<u32>,
        #[arg(long, requires = "width", conflicts_with = "reference")]
        height: Option<u32>,
        /// Region to inpaint as X,Y,WIDTH,HEIGHT (repeatable)
        #[arg(long, value_parser = parse_region)]
        region: Vec<RegionArg>,
        /// Content to remove as X0,Y0,X1,Y1[,THICKNESS] (repeatable)
        #[arg(long, value_parser = parse_stroke)]
        stroke: Vec<StrokeArg>,
    },
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let session = CliConfigBuilder::session(&cli).context("Invalid session credential")?;

    match &cli.command {
        Command::Run {
            image,
            mask,
            name,
            media_type,
        } => {
            let request = WorkflowRequest::from_paths(
                image,
                mask,
                name.as_deref(),
                media_type.as_deref(),
                session,
            )
            .await
            .context("Failed to read input files")?;

            let mut workflow = InpaintWorkflow::new(build_client(&cli)?, reporter(&cli));
            let report = workflow.run(&request).await?;
            info!(
                id = %report.target.id,
                process_status = report.process_status,
                "Workflow finished"
            );
        },
        Command::Upload {
            image,
            name,
            media_type,
        } => {
            let file = UploadFile::from_path(image, name.as_deref(), media_type.as_deref())
                .await
                .context("Failed to read image")?;
            let mut tracker = StepTracker::new(reporter(&cli));
            tracker.start(WorkflowStep::Upload);
            let outcome = build_client(&cli)?.upload(&file, session.as_ref()).await?;
            tracker.finish(Some(outcome.status), None);
            if let Some(issued) = outcome.issued_session {
                print_issued_session(&issued);
            }
        },
        Command::List { name } => {
            let mut tracker = StepTracker::new(reporter(&cli));
            tracker.start(WorkflowStep::Info);
            let listing = build_client(&cli)?.fetch_listing(session.as_ref()).await?;
            tracker.finish(Some(listing.status), None);

            match name {
                Some(name) => {
                    tracker.start(WorkflowStep::Lookup);
                    let found = find_by_file_name(&listing.records, name);
                    tracker.finish(None, found.map(serde_json::to_value).transpose()?);
                },
                None => println!("{}", serde_json::to_string_pretty(&listing.records)?),
            }
        },
        Command::Process { id, secret, mask } => {
            let mask_png = LocalFiles::read(mask).await.context("Failed to read mask")?;
            let target = EditorTarget::new(id.clone(), secret.clone());
            let mut tracker = StepTracker::new(reporter(&cli));
            tracker.start(WorkflowStep::Process);
            let status = build_client(&cli)?.process(&target, session.as_ref(), &mask_png).await?;
            tracker.finish(Some(status), None);
        },
        Command::MakeMask {
            output,
            reference,
            width,
            height,
            region,
            stroke,
        } => make_mask(output, reference.as_deref(), *width, *height, region, stroke).await?,
    }

    Ok(())
}

fn build_client(cli: &Cli) -> Result<InpaintClient> {
    let config = CliConfigBuilder::from_cli(cli).context("Invalid client configuration")?;
    let client = InpaintClient::new(&config).context("Failed to create client")?;
    debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "Client ready");
    Ok(client)
}

fn reporter(cli: &Cli) -> Box<dyn crate::services::StepReporter> {
    Box::new(CliStepReporter::new(!cli.no_progress))
}

fn print_issued_session(issued: &SessionCredential) {
    println!(
        "{}",
        serde_json::json!({ "action": "upload", "type": "session", "data": issued.cookie_header() })
    );
}

async fn make_mask(
    output: &Path,
    reference: Option<&Path>,
    width: Option<u32>,
    height: Option<u32>,
    regions: &[RegionArg],
    strokes: &[StrokeArg],
) -> Result<()> {
    let mut builder = match (reference, width, height) {
        (Some(path), _, _) => {
            let bytes = LocalFiles::read(path).await?;
            MaskBuilder::for_image(&bytes).context("Failed to read reference image")?
        },
        (None, Some(width), Some(height)) => MaskBuilder::new(width, height),
        _ => anyhow::bail!("Either --reference or both --width and --height are required"),
    };

    for region in regions {
        builder = builder.region(region.x, region.y, region.width, region.height);
    }
    for stroke in strokes {
        builder = builder.stroke(stroke.from, stroke.to, stroke.thickness);
    }

    let png = builder.build_png().context("Failed to render mask")?;
    let written = LocalFiles::write(output, &png).await?;
    info!(path = %written.display(), bytes = png.len(), "Mask written");
    Ok(())
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    let mut config = TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::Console);

    if let Ok(filter) = std::env::var("RUST_LOG") {
        config = config.with_env_filter(filter);
    }

    config
        .init()
        .context("Failed to initialize tracing subscriber")?;

    debug!(verbosity = verbose_count, "Tracing initialized");
    Ok(())
}
