//! Error types for ClearCut sessions

use thiserror::Error;

/// Result type alias for ClearCut operations
pub type Result<T> = std::result::Result<T, ClearCutError>;

/// Error types for intake, removal and download operations
#[derive(Error, Debug)]
pub enum ClearCutError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format detection errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unsupported file format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The external removal capability rejected the image
    #[error("Background removal failed: {0}")]
    Removal(String),

    /// The removal capability could not be started at all
    #[error("Background remover unavailable: {0}")]
    RemoverUnavailable(String),

    /// Operation not allowed in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClearCutError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new removal error
    pub fn removal<S: Into<String>>(msg: S) -> Self {
        Self::Removal(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with the accepted values
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        expected: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (expected: {})",
            parameter, value, expected
        ))
    }

    /// Create removal error naming the capability that failed
    pub fn removal_failed(backend: &str, details: &str) -> Self {
        Self::Removal(format!("'{}' backend: {}", backend, details))
    }

    /// Create error for a removal capability that cannot be reached
    pub fn remover_unavailable(backend: &str, details: &str) -> Self {
        Self::RemoverUnavailable(format!("'{}' backend: {}", backend, details))
    }
}
