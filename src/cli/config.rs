//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliBackend};
use crate::config::{BackendKind, ClearCutConfig, ClearCutConfigBuilder, ProgressFormat};
use anyhow::{Context, Result};

impl From<CliBackend> for BackendKind {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::Command => Self::Command,
            CliBackend::Mock => Self::Mock,
        }
    }
}

/// Convert CLI arguments to a `ClearCutConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration: config file first, flags on top
    pub(crate) fn from_cli(cli: &Cli) -> Result<ClearCutConfig> {
        let base = match &cli.config {
            Some(path) => ClearCutConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => ClearCutConfig::default(),
        };

        let mut builder = ClearCutConfigBuilder::from_config(base);
        if let Some(backend) = cli.backend {
            builder = builder.backend(backend.into());
        }
        if let Some(program) = &cli.program {
            builder = builder.program(program.clone());
        }
        if let Some(dir) = &cli.output_dir {
            builder = builder.output_dir(dir.clone());
        }
        if cli.overwrite {
            builder = builder.overwrite(true);
        }
        if cli.json {
            builder = builder.progress_format(ProgressFormat::Json);
        } else if cli.quiet {
            builder = builder.progress_format(ProgressFormat::Quiet);
        }

        builder.build().context("Invalid configuration")
    }
}
