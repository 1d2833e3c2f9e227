//! ClearCut CLI tool
//!
//! Removes the background of a single image with the configured removal
//! backend and saves the result next to your downloads.

#[cfg(feature = "cli")]
use clearcut::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
