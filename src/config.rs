//! Configuration types for ClearCut sessions

use crate::backends::command::{INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::error::{ClearCutError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default external removal tool
pub const DEFAULT_PROGRAM: &str = "imgly-bgremove";

/// Which remover implementation a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// External executable
    #[default]
    Command,
    /// Scripted fake, no inference
    Mock,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// How status and focus changes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressFormat {
    /// Spinner with status text
    #[default]
    Console,
    /// One JSON object per line on stdout
    Json,
    Quiet,
}

/// External tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Program name or path
    pub program: String,
    /// Argument template; `{input}` and `{output}` are replaced per run
    pub args: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: vec![
                INPUT_PLACEHOLDER.to_string(),
                "--output".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
            ],
        }
    }
}

/// Configuration for a ClearCut session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearCutConfig {
    /// Remover implementation
    pub backend: BackendKind,

    /// External tool settings, used by [`BackendKind::Command`]
    pub command: CommandConfig,

    /// Download directory (None = the user's download directory)
    pub output_dir: Option<PathBuf>,

    /// Replace an existing download instead of picking a free name
    pub overwrite: bool,

    /// Progress rendering
    pub progress_format: ProgressFormat,
}

impl ClearCutConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ClearCutConfigBuilder {
        ClearCutConfigBuilder::new()
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClearCutError::file_io_error("read config file", path, &e))?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            ClearCutError::invalid_config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.backend == BackendKind::Command {
            if self.command.program.trim().is_empty() {
                return Err(ClearCutError::invalid_config(
                    "command program must not be empty",
                ));
            }
            for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
                if !self.command.args.iter().any(|arg| arg.contains(placeholder)) {
                    return Err(ClearCutError::config_value_error(
                        "command args",
                        self.command.args.join(" "),
                        &format!("a template containing {}", placeholder),
                    ));
                }
            }
        }

        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ClearCutError::config_value_error(
                    "output_dir",
                    dir.display(),
                    "a directory",
                ));
            }
        }

        Ok(())
    }

    /// Directory downloads are saved to
    #[must_use]
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Builder for `ClearCutConfig`
#[derive(Debug, Default)]
pub struct ClearCutConfigBuilder {
    config: ClearCutConfig,
}

impl ClearCutConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from a file
    #[must_use]
    pub fn from_config(config: ClearCutConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    #[must_use]
    pub fn program<S: Into<String>>(mut self, program: S) -> Self {
        self.config.command.program = program.into();
        self
    }

    #[must_use]
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.config.command.args = args;
        self
    }

    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn progress_format(mut self, format: ProgressFormat) -> Self {
        self.config.progress_format = format;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ClearCutConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
