//! Log subscriber setup for the CLI
//!
//! The library only emits `tracing` events. The binary installs one
//! subscriber, on stderr so JSON presenter lines on stdout stay parseable.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable that overrides the verbosity flags
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Shape of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Colored, one line per event
    #[default]
    Console,
    /// No colors, for CI logs
    Compact,
    /// One JSON object per event (needs the `tracing-json` feature)
    Json,
}

/// Subscriber settings for one run
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    verbosity: u8,
    format: LogFormat,
    filter: Option<String>,
    session_id: Option<String>,
}

impl LogSettings {
    #[must_use]
    pub fn new(verbosity: u8, format: LogFormat) -> Self {
        Self {
            verbosity,
            format,
            ..Self::default()
        }
    }

    /// Use an explicit filter directive instead of the verbosity level
    ///
    /// Blank directives are ignored.
    #[must_use]
    pub fn with_filter(mut self, directive: Option<String>) -> Self {
        self.filter = directive.filter(|d| !d.trim().is_empty());
        self
    }

    /// Correlation id attached to the startup event
    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Filter directive in effect: the explicit one, else the verbosity level
    #[must_use]
    pub fn directive(&self) -> &str {
        match &self.filter {
            Some(filter) => filter,
            None => match self.verbosity {
                0 => "info",
                1 => "debug",
                _ => "trace",
            },
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - The filter directive does not parse
    /// - JSON output was requested without the `tracing-json` feature
    /// - A global subscriber is already installed
    pub fn install(self) -> anyhow::Result<()> {
        let registry = Registry::default().with(EnvFilter::try_new(self.directive())?);

        match self.format {
            LogFormat::Console => registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
                .try_init()?,
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(false)
                        .with_target(false)
                        .compact(),
                )
                .try_init()?,
            #[cfg(feature = "tracing-json")]
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .json()
                        .with_current_span(true)
                        .with_span_list(true),
                )
                .try_init()?,
            #[cfg(not(feature = "tracing-json"))]
            LogFormat::Json => {
                anyhow::bail!("JSON logs need clearcut built with the tracing-json feature")
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "Logging initialized");
        }
        Ok(())
    }
}

/// Install the CLI subscriber, honoring `RUST_LOG` over `-v`
pub fn init_cli_tracing(verbosity: u8, format: LogFormat, session_id: &str) -> anyhow::Result<()> {
    LogSettings::new(verbosity, format)
        .with_filter(std::env::var(LOG_FILTER_ENV).ok())
        .with_session_id(session_id)
        .install()
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span for one CLI run
    pub fn session(session_id: &str, backend: &str) -> Span {
        tracing::span!(Level::INFO, "session", session_id = %session_id, backend = %backend)
    }

    /// Span for reading a dropped file
    pub fn intake(file_path: &std::path::Path) -> Span {
        tracing::span!(Level::DEBUG, "intake", file_path = %file_path.display())
    }

    /// Span for saving the result
    pub fn download(destination: &std::path::Path) -> Span {
        tracing::span!(Level::DEBUG, "download", destination = %destination.display())
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{error, warn};

    /// Log an error with context
    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(error = %error, context = %context, "Operation failed");
    }

    /// Log a warning with recommendation
    pub fn warning_with_recommendation(message: &str, recommendation: &str) {
        warn!(message = %message, recommendation = %recommendation, "Warning");
    }
}
