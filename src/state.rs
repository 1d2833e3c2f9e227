//! Session state machine
//!
//! All session state lives in [`SessionState`] and changes only through
//! [`reduce`]. Each transition returns the side effects it requires
//! (handle revocation, focus changes, status updates, submission) as data,
//! so the driver in [`crate::session`] stays a thin interpreter and the
//! invariants below can be checked without any runtime:
//!
//! - a result handle exists only in [`ProcessingState::Done`]
//! - a status message exists only in [`ProcessingState::Running`]
//! - every handle that leaves the state is emitted as [`Effect::Revoke`]

use crate::handles::ObjectUrl;
use crate::phase::{status_update, ProgressEvent, StatusMessage, StatusUpdate};
use crate::presentation::View;
use crate::types::ImageFile;
use std::fmt;

/// The image currently offered for processing, with its preview handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file: ImageFile,
    pub preview: ObjectUrl,
}

/// Processing lifecycle of the selected file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessingState {
    #[default]
    Idle,
    Running {
        status: Option<StatusMessage>,
    },
    Done {
        result: ObjectUrl,
    },
    Failed {
        reason: String,
    },
}

impl ProcessingState {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::Done { .. } => "done",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone)]
pub enum Action {
    /// A validated image was dropped; its preview handle is already registered
    SelectFile { file: ImageFile, preview: ObjectUrl },
    /// The user pressed the trigger
    StartProcessing,
    /// The removal capability reported progress
    Progress(ProgressEvent),
    /// The removal capability produced a result, registered under `result`
    Succeeded { result: ObjectUrl },
    /// The removal capability rejected
    Failed { reason: String },
    /// The user picked a view
    ShowView(View),
    /// The session is being discarded
    Teardown,
}

/// Side effects requested by a transition, in the order they must run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Revoke(ObjectUrl),
    Focus(View),
    Status(Option<StatusMessage>),
    Busy(bool),
    Submit(ImageFile),
    LogFailure(String),
}

/// Why an action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Processing is in flight
    Busy,
    NoFileSelected,
    /// Progress or completion arrived while not processing
    NotRunning,
    /// The processed view was requested without a result
    NoResult,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "processing is already running"),
            Self::NoFileSelected => write!(f, "no image selected"),
            Self::NotRunning => write!(f, "no processing in flight"),
            Self::NoResult => write!(f, "no processed result available"),
        }
    }
}

/// Outcome of applying one action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub rejected: Option<Rejection>,
}

impl Transition {
    fn accepted(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            rejected: None,
        }
    }

    fn rejected(reason: Rejection, effects: Vec<Effect>) -> Self {
        Self {
            effects,
            rejected: Some(reason),
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }
}

/// Complete UI state of one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    selected: Option<SelectedFile>,
    processing: ProcessingState,
    active_view: View,
}

impl SessionState {
    #[must_use]
    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn processing(&self) -> &ProcessingState {
        &self.processing
    }

    #[must_use]
    pub fn active_view(&self) -> View {
        self.active_view
    }

    /// Busy flag: set exactly while processing runs
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.processing.is_running()
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusMessage> {
        match &self.processing {
            ProcessingState::Running { status } => *status,
            _ => None,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&ObjectUrl> {
        match &self.processing {
            ProcessingState::Done { result } => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.processing {
            ProcessingState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Whether the trigger is enabled
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.selected.is_some() && !self.is_busy()
    }

    /// Apply an action in place
    pub fn apply(&mut self, action: Action) -> Transition {
        let (next, transition) = reduce(std::mem::take(self), action);
        *self = next;
        transition
    }
}

/// The transition function
#[must_use]
pub fn reduce(state: SessionState, action: Action) -> (SessionState, Transition) {
    match action {
        Action::SelectFile { file, preview } => select_file(state, file, preview),
        Action::StartProcessing => start_processing(state),
        Action::Progress(event) => progress(state, &event),
        Action::Succeeded { result } => succeeded(state, result),
        Action::Failed { reason } => failed(state, reason),
        Action::ShowView(view) => show_view(state, view),
        Action::Teardown => teardown(state),
    }
}

fn select_file(
    mut state: SessionState,
    file: ImageFile,
    preview: ObjectUrl,
) -> (SessionState, Transition) {
    // intake is locked while a run is in flight
    if state.is_busy() {
        return (
            state,
            Transition::rejected(Rejection::Busy, vec![Effect::Revoke(preview)]),
        );
    }

    let mut effects = Vec::new();
    if let Some(previous) = state.selected.take() {
        effects.push(Effect::Revoke(previous.preview));
    }
    if let ProcessingState::Done { result } = std::mem::take(&mut state.processing) {
        effects.push(Effect::Revoke(result));
    }

    state.selected = Some(SelectedFile { file, preview });
    state.active_view = View::Original;
    effects.push(Effect::Focus(View::Original));

    (state, Transition::accepted(effects))
}

fn start_processing(mut state: SessionState) -> (SessionState, Transition) {
    if state.is_busy() {
        return (state, Transition::rejected(Rejection::Busy, Vec::new()));
    }
    let Some(file) = state.selected.as_ref().map(|s| s.file.clone()) else {
        return (
            state,
            Transition::rejected(Rejection::NoFileSelected, Vec::new()),
        );
    };

    let mut effects = Vec::new();
    if let ProcessingState::Done { result } = std::mem::take(&mut state.processing) {
        effects.push(Effect::Revoke(result));
    }

    state.processing = ProcessingState::Running { status: None };
    effects.push(Effect::Busy(true));
    effects.push(Effect::Submit(file));

    (state, Transition::accepted(effects))
}

fn progress(mut state: SessionState, event: &ProgressEvent) -> (SessionState, Transition) {
    if !state.is_busy() {
        return (state, Transition::rejected(Rejection::NotRunning, Vec::new()));
    }

    let next = match status_update(event) {
        StatusUpdate::Set(message) => Some(message),
        StatusUpdate::Clear => None,
        StatusUpdate::Ignore => return (state, Transition::default()),
    };

    if state.status() == next {
        return (state, Transition::default());
    }
    state.processing = ProcessingState::Running { status: next };
    (state, Transition::accepted(vec![Effect::Status(next)]))
}

fn finish_run(state: &mut SessionState, effects: &mut Vec<Effect>) -> bool {
    let ProcessingState::Running { status } = &state.processing else {
        return false;
    };
    if status.is_some() {
        effects.push(Effect::Status(None));
    }
    effects.push(Effect::Busy(false));
    true
}

fn succeeded(mut state: SessionState, result: ObjectUrl) -> (SessionState, Transition) {
    let mut effects = Vec::new();
    if !finish_run(&mut state, &mut effects) {
        // a late result nobody waits for must not leak
        return (
            state,
            Transition::rejected(Rejection::NotRunning, vec![Effect::Revoke(result)]),
        );
    }

    state.processing = ProcessingState::Done { result };
    state.active_view = View::Processed;
    effects.push(Effect::Focus(View::Processed));
    (state, Transition::accepted(effects))
}

fn failed(mut state: SessionState, reason: String) -> (SessionState, Transition) {
    let mut effects = Vec::new();
    if !finish_run(&mut state, &mut effects) {
        return (state, Transition::rejected(Rejection::NotRunning, Vec::new()));
    }

    effects.push(Effect::LogFailure(reason.clone()));
    state.processing = ProcessingState::Failed { reason };
    (state, Transition::accepted(effects))
}

fn show_view(mut state: SessionState, view: View) -> (SessionState, Transition) {
    if view == View::Processed && state.result().is_none() {
        return (state, Transition::rejected(Rejection::NoResult, Vec::new()));
    }
    if state.active_view == view {
        return (state, Transition::default());
    }
    state.active_view = view;
    (state, Transition::accepted(vec![Effect::Focus(view)]))
}

fn teardown(mut state: SessionState) -> (SessionState, Transition) {
    let mut effects = Vec::new();
    finish_run(&mut state, &mut effects);
    if let Some(selected) = state.selected.take() {
        effects.push(Effect::Revoke(selected.preview));
    }
    if let ProcessingState::Done { result } = std::mem::take(&mut state.processing) {
        effects.push(Effect::Revoke(result));
    }
    (SessionState::default(), Transition::accepted(effects))
}
