//! ClearCut CLI
//!
//! Treats the command line as a drop zone: the given path is selected,
//! processed once, and the result is saved as `<name>_clearcut.png`.

use super::config::CliConfigBuilder;
use crate::{
    backends::create_remover,
    config::{ClearCutConfig, ProgressFormat},
    download::DirectoryTarget,
    services::{ConsolePresenter, FileIntakeService, JsonPresenter, NoOpPresenter, Presenter},
    session::{FailureKind, RunOutcome, Session},
    tracing_config::{events, init_cli_tracing, spans, LogFormat},
    types::DroppedFile,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// Remove the background of an image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "clearcut")]
pub struct Cli {
    /// Image to process. Dropping several files at once is ignored.
    #[arg(value_name = "INPUT")]
    pub input: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Removal backend
    #[arg(short, long, value_enum)]
    pub backend: Option<CliBackend>,

    /// Removal program used by the command backend [default: imgly-bgremove]
    #[arg(long, value_name = "PATH")]
    pub program: Option<String>,

    /// Directory the result is saved to [default: your download directory]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Replace an existing result file instead of choosing a new name
    #[arg(long)]
    pub overwrite: bool,

    /// Print progress as JSON lines
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Hide progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Format of log lines on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Console)]
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBackend {
    /// Run an external removal program
    Command,
    /// Scripted removal for demos, returns the input unchanged
    Mock,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = uuid::Uuid::new_v4().to_string();
    init_cli_tracing(cli.verbose, cli.log_format, &session_id)
        .context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    let span = spans::session(&session_id, &config.backend.to_string());
    run(&cli, &config).instrument(span).await
}

async fn run(cli: &Cli, config: &ClearCutConfig) -> Result<()> {
    let dropped = match read_drop(&cli.input) {
        Ok(dropped) => dropped,
        Err(e) => {
            events::warning_with_recommendation(
                &format!("Input ignored: {}", e),
                "pass the path of a readable image file",
            );
            return Ok(());
        },
    };

    let mut session = Session::with_presenter(
        create_remover(config),
        create_presenter(config.progress_format),
    );

    if session.select_drop(dropped).is_none() {
        warn!("Nothing selected: drop exactly one image file");
        return Ok(());
    }

    let outcome = session
        .process()
        .await
        .context("Failed to start background removal")?;

    if config.progress_format == ProgressFormat::Json {
        println!("{}", serde_json::to_string(&session.view_model())?);
    }

    match outcome {
        RunOutcome::Done(result) => {
            let target = DirectoryTarget::new(config.resolved_output_dir())
                .with_overwrite(config.overwrite);
            let path = {
                let _span = spans::download(target.dir()).entered();
                session.download(&target).context("Failed to save result")?
            };
            info!(result = %result, "Background removed");
            report_saved(config.progress_format, &path);
            Ok(())
        },
        RunOutcome::Failed(failure) => {
            if failure.kind == FailureKind::RemoverUnavailable {
                events::warning_with_recommendation(
                    "The removal program could not be started",
                    "install imgly-bgremove or pass --program",
                );
            }
            anyhow::bail!("Processing failed: {}", failure.reason)
        },
    }
}

fn read_drop(paths: &[PathBuf]) -> crate::Result<Vec<DroppedFile>> {
    paths
        .iter()
        .map(|path| {
            let _span = spans::intake(path).entered();
            FileIntakeService::load(path).map_err(|e| {
                events::error_with_context(&e, "reading dropped file");
                e
            })
        })
        .collect()
}

fn create_presenter(format: ProgressFormat) -> Arc<dyn Presenter> {
    match format {
        ProgressFormat::Console => Arc::new(ConsolePresenter::new()),
        ProgressFormat::Json => Arc::new(JsonPresenter),
        ProgressFormat::Quiet => Arc::new(NoOpPresenter),
    }
}

fn report_saved(format: ProgressFormat, path: &std::path::Path) {
    match format {
        ProgressFormat::Json => println!(
            "{}",
            serde_json::json!({ "event": "saved", "path": path.display().to_string() })
        ),
        ProgressFormat::Console => println!("✅ Saved {}", path.display()),
        ProgressFormat::Quiet => {},
    }
}
