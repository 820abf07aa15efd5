//! Inpainting service CLI tool
//!
//! Command-line interface for uploading an image to theinpaint.com and
//! submitting a mask for it.

#[cfg(feature = "cli")]
use inpaint_client::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
