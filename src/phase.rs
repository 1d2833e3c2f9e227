//! Progress protocol of the external removal capability
//!
//! The capability reports `(key, current, total)` triples. Keys starting
//! with `fetch:` describe model downloads, `compute:inference` describes
//! the inference pass. Other keys are tolerated and ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key prefix for model download progress
pub const FETCH_KEY_PREFIX: &str = "fetch:";

/// Key for inference progress
pub const COMPUTE_INFERENCE_KEY: &str = "compute:inference";

/// One progress report from the removal capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub key: String,
    pub current: u64,
    pub total: u64,
}

impl ProgressEvent {
    pub fn new<S: Into<String>>(key: S, current: u64, total: u64) -> Self {
        Self {
            key: key.into(),
            current,
            total,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::classify(&self.key)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }
}

/// Pipeline stage a progress key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ModelFetch,
    Compute,
    Unrecognized,
}

impl Phase {
    #[must_use]
    pub fn classify(key: &str) -> Self {
        if key.starts_with(FETCH_KEY_PREFIX) {
            Self::ModelFetch
        } else if key == COMPUTE_INFERENCE_KEY {
            Self::Compute
        } else {
            Self::Unrecognized
        }
    }
}

/// Human-readable status shown over the preview while processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMessage {
    DownloadingModel,
    ProcessingImage,
}

impl StatusMessage {
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::DownloadingModel => "downloading model",
            Self::ProcessingImage => "processing image",
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// What a progress event does to the status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Set(StatusMessage),
    Clear,
    Ignore,
}

/// Map a progress event to its status update
#[must_use]
pub fn status_update(event: &ProgressEvent) -> StatusUpdate {
    match event.phase() {
        Phase::ModelFetch => StatusUpdate::Set(StatusMessage::DownloadingModel),
        Phase::Compute if event.is_complete() => StatusUpdate::Clear,
        Phase::Compute => StatusUpdate::Set(StatusMessage::ProcessingImage),
        Phase::Unrecognized => StatusUpdate::Ignore,
    }
}
