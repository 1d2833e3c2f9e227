//! Session driver
//!
//! [`Session`] owns the state machine, the handle store and the remover. It
//! feeds user actions and removal events into [`crate::state::reduce`] and
//! executes the returned effects. At most one removal is in flight; events
//! are applied in the order the remover emitted them.

use crate::{
    download::{download_file_name, SaveTarget},
    error::{ClearCutError, Result},
    handles::{HandleStore, ObjectUrl},
    intake,
    presentation::{View, ViewModel},
    removal::{submit, BackgroundRemover, Submission, SubmissionEvent},
    services::{NoOpPresenter, Presenter},
    state::{Action, Effect, SessionState, Transition},
    types::{DroppedFile, ImageFile},
};
use futures::StreamExt;
use instant::Instant;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Why a processing run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The remover ran and rejected the image
    Removal,
    /// The remover could not be started
    RemoverUnavailable,
    /// The run ended without a result
    Internal,
}

impl FailureKind {
    fn of(error: &ClearCutError) -> Self {
        match error {
            ClearCutError::RemoverUnavailable(_) => Self::RemoverUnavailable,
            ClearCutError::Internal(_) => Self::Internal,
            _ => Self::Removal,
        }
    }
}

/// A failed run, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub reason: String,
    pub kind: FailureKind,
}

/// How a processing run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Done(ObjectUrl),
    Failed(RunFailure),
}

/// One image-editing session
pub struct Session {
    state: SessionState,
    handles: HandleStore,
    remover: Arc<dyn BackgroundRemover>,
    presenter: Arc<dyn Presenter>,
    in_flight: Option<Submission>,
    run_started: Option<Instant>,
}

impl Session {
    /// Create a session that renders nothing
    pub fn new(remover: Arc<dyn BackgroundRemover>) -> Self {
        Self::with_presenter(remover, Arc::new(NoOpPresenter))
    }

    pub fn with_presenter(
        remover: Arc<dyn BackgroundRemover>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            handles: HandleStore::new(),
            remover,
            presenter,
            in_flight: None,
            run_started: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn handles(&self) -> &HandleStore {
        &self.handles
    }

    #[must_use]
    pub fn view_model(&self) -> ViewModel {
        ViewModel::from_state(&self.state)
    }

    /// Offer a single file to intake
    ///
    /// Returns the new preview handle, or `None` when the file was ignored
    /// (not an image, empty, or intake locked while processing).
    #[instrument(skip(self, file), fields(file_name = %file.name))]
    pub fn select_file(&mut self, file: DroppedFile) -> Option<ObjectUrl> {
        intake::accept(file).and_then(|image| self.select_image(image))
    }

    /// Offer a whole drop to intake; only single-file drops are accepted
    pub fn select_drop(&mut self, files: Vec<DroppedFile>) -> Option<ObjectUrl> {
        intake::accept_drop(files).and_then(|image| self.select_image(image))
    }

    fn select_image(&mut self, image: ImageFile) -> Option<ObjectUrl> {
        if self.state.is_busy() {
            debug!("Ignoring selection while processing");
            return None;
        }

        let preview = self.handles.create(image.blob().clone());
        let transition = self.dispatch(Action::SelectFile {
            file: image,
            preview: preview.clone(),
        });
        if transition.is_rejected() {
            return None;
        }
        info!(preview = %preview, "Selected image");
        Some(preview)
    }

    /// Press the trigger
    ///
    /// Starts the remover in the background; drive it with [`Session::pump`]
    /// or [`Session::wait_for_completion`]. Must be called from within a
    /// tokio runtime.
    ///
    /// # Errors
    /// - No image is selected
    /// - Processing is already running
    pub fn start_processing(&mut self) -> Result<()> {
        let transition = self.dispatch(Action::StartProcessing);
        match transition.rejected {
            Some(reason) => {
                debug!(%reason, "Trigger rejected");
                Err(ClearCutError::invalid_state(reason.to_string()))
            },
            None => Ok(()),
        }
    }

    /// Whether a removal is in flight
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Apply the next removal event
    ///
    /// Returns the outcome once the run finishes, `None` while it is still
    /// going or when nothing is in flight.
    pub async fn pump(&mut self) -> Option<RunOutcome> {
        let event = self.in_flight.as_mut()?.next().await;
        match event {
            Some(SubmissionEvent::Progress(event)) => {
                debug!(key = %event.key, current = event.current, total = event.total, "Progress");
                self.dispatch(Action::Progress(event));
                None
            },
            Some(SubmissionEvent::Finished(Ok(processed))) => {
                self.in_flight = None;
                let result = self.handles.create(processed.into_blob());
                self.dispatch(Action::Succeeded {
                    result: result.clone(),
                });
                self.log_run_time("done");
                Some(RunOutcome::Done(result))
            },
            Some(SubmissionEvent::Finished(Err(e))) => {
                self.in_flight = None;
                Some(self.fail(e.to_string(), FailureKind::of(&e)))
            },
            None => {
                self.in_flight = None;
                Some(self.fail(
                    "removal task ended without a result".to_string(),
                    FailureKind::Internal,
                ))
            },
        }
    }

    /// Apply removal events until the run in flight finishes
    pub async fn wait_for_completion(&mut self) -> Option<RunOutcome> {
        while self.in_flight.is_some() {
            if let Some(outcome) = self.pump().await {
                return Some(outcome);
            }
        }
        None
    }

    /// Start processing and wait for it to finish
    ///
    /// # Errors
    /// - The trigger was rejected; see [`Session::start_processing`]
    pub async fn process(&mut self) -> Result<RunOutcome> {
        self.start_processing()?;
        self.wait_for_completion()
            .await
            .ok_or_else(|| ClearCutError::internal("processing started without a submission"))
    }

    /// Switch to a view; the processed view needs a result
    pub fn show_view(&mut self, view: View) -> bool {
        !self.dispatch(Action::ShowView(view)).is_rejected()
    }

    /// Save the processed result through `target`
    ///
    /// # Errors
    /// - No processed result exists
    /// - Writing to the target fails
    pub fn download(&self, target: &dyn SaveTarget) -> Result<PathBuf> {
        let result = self
            .state
            .result()
            .ok_or_else(|| ClearCutError::invalid_state("no processed result to download"))?;
        let blob = self
            .handles
            .resolve(result)
            .ok_or_else(|| ClearCutError::internal(format!("result handle {} is not live", result)))?;
        let original_name = self
            .state
            .selected()
            .map_or("", |selected| selected.file.name());

        target.save(&download_file_name(original_name), blob)
    }

    /// Release all handles and return to the initial state
    ///
    /// A removal still in flight keeps running, but its result is discarded.
    pub fn teardown(&mut self) {
        if self.in_flight.take().is_some() {
            warn!("Tearing down with processing in flight; its result will be discarded");
        }
        self.run_started = None;
        self.dispatch(Action::Teardown);
    }

    fn fail(&mut self, reason: String, kind: FailureKind) -> RunOutcome {
        self.dispatch(Action::Failed {
            reason: reason.clone(),
        });
        self.log_run_time("failed");
        RunOutcome::Failed(RunFailure { reason, kind })
    }

    fn log_run_time(&mut self, outcome: &str) {
        if let Some(started) = self.run_started.take() {
            info!(
                outcome,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Processing finished"
            );
        }
    }

    fn dispatch(&mut self, action: Action) -> Transition {
        let transition = self.state.apply(action);
        for effect in &transition.effects {
            self.run_effect(effect);
        }
        transition
    }

    fn run_effect(&mut self, effect: &Effect) {
        match effect {
            Effect::Revoke(url) => {
                self.handles.revoke(url);
            },
            Effect::Focus(view) => self.presenter.on_focus(*view),
            Effect::Status(status) => self.presenter.on_status(*status),
            Effect::Busy(busy) => self.presenter.on_busy(*busy),
            Effect::Submit(image) => {
                info!(backend = %self.remover.name(), file_name = %image.name(), "Starting background removal");
                self.run_started = Some(Instant::now());
                self.in_flight = Some(submit(Arc::clone(&self.remover), image.clone()));
            },
            Effect::LogFailure(reason) => {
                error!(backend = %self.remover.name(), %reason, "Background removal failed");
                self.presenter.on_failure(reason);
            },
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ScriptedRemover;
    use crate::phase::{ProgressEvent, StatusMessage};
    use crate::services::{PresenterEvent, RecordingPresenter};
    use crate::state::ProcessingState;

    fn jpeg(name: &str) -> DroppedFile {
        DroppedFile::new(name, vec![0xFF, 0xD8, 0xFF, 0xE0]).with_type("image/jpeg")
    }

    #[tokio::test]
    async fn test_process_success() {
        let mut session = Session::new(Arc::new(ScriptedRemover::cold_start("medium", 2)));
        session.select_file(jpeg("photo.jpg")).unwrap();

        let outcome = session.process().await.unwrap();
        let RunOutcome::Done(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(session.state().result(), Some(&result));
        assert!(session.handles().is_live(&result));
        assert_eq!(session.state().active_view(), View::Processed);
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_pump_applies_progress_in_order() {
        let presenter = Arc::new(RecordingPresenter::new());
        let remover = ScriptedRemover::new().with_progress(vec![
            ProgressEvent::new("fetch:medium", 1, 2),
            ProgressEvent::new("compute:inference", 0, 1),
        ]);
        let mut session = Session::with_presenter(Arc::new(remover), presenter.clone());
        session.select_file(jpeg("photo.jpg"));
        session.start_processing().unwrap();

        assert!(session.pump().await.is_none());
        assert_eq!(session.state().status(), Some(StatusMessage::DownloadingModel));
        assert!(session.pump().await.is_none());
        assert_eq!(session.state().status(), Some(StatusMessage::ProcessingImage));
        assert!(matches!(session.pump().await, Some(RunOutcome::Done(_))));
        assert!(session.pump().await.is_none());

        assert_eq!(
            presenter.events(),
            vec![
                PresenterEvent::Focus {
                    view: View::Original
                },
                PresenterEvent::Busy { busy: true },
                PresenterEvent::Status {
                    status: Some(StatusMessage::DownloadingModel)
                },
                PresenterEvent::Status {
                    status: Some(StatusMessage::ProcessingImage)
                },
                PresenterEvent::Status { status: None },
                PresenterEvent::Busy { busy: false },
                PresenterEvent::Focus {
                    view: View::Processed
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_selection_ignored_while_processing() {
        let mut session = Session::new(Arc::new(ScriptedRemover::new()));
        session.select_file(jpeg("first.jpg"));
        session.start_processing().unwrap();

        assert!(session.select_file(jpeg("second.jpg")).is_none());
        assert_eq!(session.handles().live_count(), 1);
        assert_eq!(session.state().selected().unwrap().file.name(), "first.jpg");

        session.wait_for_completion().await;
        assert!(matches!(session.state().processing(), ProcessingState::Done { .. }));
    }

    #[tokio::test]
    async fn test_failure_reported_to_presenter() {
        let presenter = Arc::new(RecordingPresenter::new());
        let mut session = Session::with_presenter(
            Arc::new(ScriptedRemover::new().failing("wasm trap")),
            presenter.clone(),
        );
        session.select_file(jpeg("photo.jpg"));

        let outcome = session.process().await.unwrap();
        let RunOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(failure.reason.contains("wasm trap"));
        assert_eq!(failure.kind, FailureKind::Removal);
        assert!(presenter
            .events()
            .iter()
            .any(|e| matches!(e, PresenterEvent::Failure { reason } if reason.contains("wasm trap"))));
    }

    #[tokio::test]
    async fn test_teardown_releases_handles() {
        let mut session = Session::new(Arc::new(ScriptedRemover::new()));
        session.select_file(jpeg("photo.jpg"));
        session.process().await.unwrap();
        assert_eq!(session.handles().live_count(), 2);

        session.teardown();
        assert_eq!(session.handles().live_count(), 0);
        assert_eq!(session.handles().stale_revocation_count(), 0);
        assert_eq!(session.state(), &SessionState::default());
    }

    #[test]
    fn test_trigger_without_selection() {
        let mut session = Session::new(Arc::new(ScriptedRemover::new()));
        let err = session.start_processing().unwrap_err();
        assert!(matches!(err, ClearCutError::InvalidState(_)));
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_unstartable_remover_is_classified() {
        let remover = crate::backends::CommandRemover::new(
            "/nonexistent/clearcut-remover",
            vec!["{input}".to_string(), "{output}".to_string()],
        );
        let mut session = Session::new(Arc::new(remover));
        session.select_file(jpeg("photo.jpg"));

        let RunOutcome::Failed(failure) = session.process().await.unwrap() else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::RemoverUnavailable);
        assert!(session.state().failure_reason().is_some());
    }

    #[test]
    fn test_select_drop_shares_intake_rules() {
        let mut session = Session::new(Arc::new(ScriptedRemover::new()));
        assert!(session.select_drop(vec![jpeg("a.jpg"), jpeg("b.jpg")]).is_none());
        assert!(session
            .select_drop(vec![DroppedFile::new("notes.txt", b"hi".to_vec())])
            .is_none());
        assert_eq!(session.handles().created_count(), 0);

        let preview = session.select_drop(vec![jpeg("a.jpg")]).unwrap();
        assert!(session.handles().is_live(&preview));
        assert_eq!(session.state().selected().unwrap().file.name(), "a.jpg");
    }
}
