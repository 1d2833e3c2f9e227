//! Scripted remover for tests and offline demos
//!
//! Replays a fixed list of progress events, then succeeds or fails as
//! configured. Calls are recorded so tests can verify how the session
//! drove the remover.

use crate::{
    error::{ClearCutError, Result},
    phase::{ProgressEvent, COMPUTE_INFERENCE_KEY},
    removal::{BackgroundRemover, ProgressCallback},
    types::{ImageFile, ProcessedImage},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted remover returns after replaying its progress
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return the input bytes unchanged
    EchoInput,
    /// Return fixed bytes
    Bytes(Vec<u8>),
    /// Fail with the given reason
    Fail(String),
}

/// Remover that replays a script instead of running inference
#[derive(Debug, Clone)]
pub struct ScriptedRemover {
    progress: Vec<ProgressEvent>,
    outcome: ScriptedOutcome,
    step_delay: Option<Duration>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRemover {
    /// Create a remover that reports no progress and echoes its input
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: Vec::new(),
            outcome: ScriptedOutcome::EchoInput,
            step_delay: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a remover with the progress sequence of a cold start:
    /// a chunked model download followed by one inference pass
    #[must_use]
    pub fn cold_start(model: &str, chunks: u64) -> Self {
        let key = format!("fetch:{}", model);
        let mut progress: Vec<ProgressEvent> = (1..=chunks)
            .map(|chunk| ProgressEvent::new(key.clone(), chunk, chunks))
            .collect();
        progress.push(ProgressEvent::new(COMPUTE_INFERENCE_KEY, 0, 1));
        progress.push(ProgressEvent::new(COMPUTE_INFERENCE_KEY, 1, 1));
        Self::new().with_progress(progress)
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Vec<ProgressEvent>) -> Self {
        self.progress = progress;
        self
    }

    /// Sleep between progress events
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn returning(mut self, bytes: Vec<u8>) -> Self {
        self.outcome = ScriptedOutcome::Bytes(bytes);
        self
    }

    #[must_use]
    pub fn failing<S: Into<String>>(mut self, reason: S) -> Self {
        self.outcome = ScriptedOutcome::Fail(reason.into());
        self
    }

    /// Get the call history for verification in tests
    pub fn call_history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn record_call(&self, entry: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(entry);
        }
    }
}

impl Default for ScriptedRemover {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundRemover for ScriptedRemover {
    fn name(&self) -> &str {
        "mock"
    }

    async fn remove_background(
        &self,
        image: &ImageFile,
        progress: ProgressCallback,
    ) -> Result<ProcessedImage> {
        self.record_call(format!("remove_background:{}", image.name()));

        for event in &self.progress {
            if let Some(delay) = self.step_delay {
                tokio::time::sleep(delay).await;
            }
            progress(event.clone());
        }

        match &self.outcome {
            ScriptedOutcome::EchoInput => Ok(ProcessedImage::png(image.blob().bytes().to_vec())),
            ScriptedOutcome::Bytes(bytes) => Ok(ProcessedImage::png(bytes.clone())),
            ScriptedOutcome::Fail(reason) => {
                Err(ClearCutError::removal_failed(self.name(), reason))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake;
    use crate::types::DroppedFile;

    fn image() -> ImageFile {
        intake::accept(DroppedFile::new("cat.png", vec![9, 9]).with_type("image/png")).unwrap()
    }

    fn collector() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |event| sink.lock().unwrap().push(event));
        (callback, seen)
    }

    #[tokio::test]
    async fn test_cold_start_script() {
        let remover = ScriptedRemover::cold_start("medium", 3);
        let (callback, seen) = collector();
        let result = remover.remove_background(&image(), callback).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], ProgressEvent::new("fetch:medium", 1, 3));
        assert_eq!(seen[4], ProgressEvent::new(COMPUTE_INFERENCE_KEY, 1, 1));
        assert_eq!(result.blob().bytes(), &[9, 9]);
        assert_eq!(remover.call_history(), vec!["remove_background:cat.png"]);
    }

    #[tokio::test]
    async fn test_fixed_bytes_and_failure() {
        let (callback, _) = collector();
        let remover = ScriptedRemover::new().returning(vec![1, 2]);
        let result = remover.remove_background(&image(), callback.clone()).await.unwrap();
        assert_eq!(result.blob().bytes(), &[1, 2]);

        let remover = ScriptedRemover::new().failing("no model");
        let err = remover.remove_background(&image(), callback).await.unwrap_err();
        assert!(matches!(err, ClearCutError::Removal(_)));
        assert!(err.to_string().contains("no model"));
    }
}
