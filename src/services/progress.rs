//! Presentation service
//!
//! Sessions report focus, busy and status changes through [`Presenter`],
//! so each frontend renders them its own way.

use crate::phase::StatusMessage;
use crate::presentation::View;
use serde::Serialize;
use std::sync::Mutex;

/// Trait for rendering session transitions
pub trait Presenter: Send + Sync {
    /// A view should be brought to front
    fn on_focus(&self, view: View);

    /// The busy overlay should be shown or hidden
    fn on_busy(&self, busy: bool);

    /// The status text changed
    fn on_status(&self, status: Option<StatusMessage>);

    /// A run failed
    ///
    /// Failures never block the user; the default implementation ignores them.
    fn on_failure(&self, _reason: &str) {}
}

/// Presenter that discards everything
#[derive(Debug, Default)]
pub struct NoOpPresenter;

impl Presenter for NoOpPresenter {
    fn on_focus(&self, _view: View) {}

    fn on_busy(&self, _busy: bool) {}

    fn on_status(&self, _status: Option<StatusMessage>) {}
}

/// A presenter call, as recorded or serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresenterEvent {
    Focus { view: View },
    Busy { busy: bool },
    Status { status: Option<StatusMessage> },
    Failure { reason: String },
}

/// Presenter writing one JSON object per event to stdout
#[derive(Debug, Default)]
pub struct JsonPresenter;

impl JsonPresenter {
    fn emit(event: &PresenterEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to serialize presenter event: {}", e),
        }
    }
}

impl Presenter for JsonPresenter {
    fn on_focus(&self, view: View) {
        Self::emit(&PresenterEvent::Focus { view });
    }

    fn on_busy(&self, busy: bool) {
        Self::emit(&PresenterEvent::Busy { busy });
    }

    fn on_status(&self, status: Option<StatusMessage>) {
        Self::emit(&PresenterEvent::Status { status });
    }

    fn on_failure(&self, reason: &str) {
        Self::emit(&PresenterEvent::Failure {
            reason: reason.to_string(),
        });
    }
}

/// Presenter that keeps every call, for tests
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Status changes received so far
    pub fn statuses(&self) -> Vec<Option<StatusMessage>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Status { status } => Some(status),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: PresenterEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Presenter for RecordingPresenter {
    fn on_focus(&self, view: View) {
        self.record(PresenterEvent::Focus { view });
    }

    fn on_busy(&self, busy: bool) {
        self.record(PresenterEvent::Busy { busy });
    }

    fn on_status(&self, status: Option<StatusMessage>) {
        self.record(PresenterEvent::Status { status });
    }

    fn on_failure(&self, reason: &str) {
        self.record(PresenterEvent::Failure {
            reason: reason.to_string(),
        });
    }
}

/// Console presenter rendering the busy overlay as a spinner
#[cfg(feature = "cli")]
pub struct ConsolePresenter {
    spinner: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl ConsolePresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_spinner(indicatif::ProgressBar::new_spinner())
    }

    fn with_spinner(spinner: indicatif::ProgressBar) -> Self {
        spinner.set_style(
            indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
        );
        Self { spinner }
    }
}

#[cfg(feature = "cli")]
impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl Presenter for ConsolePresenter {
    fn on_focus(&self, view: View) {
        tracing::debug!(%view, "Focus changed");
    }

    fn on_busy(&self, busy: bool) {
        if busy {
            // a finished bar stays finished until reset
            self.spinner.reset();
            self.spinner.set_message("working");
            self.spinner
                .enable_steady_tick(std::time::Duration::from_millis(100));
        } else {
            self.spinner.disable_steady_tick();
            self.spinner.finish_and_clear();
        }
    }

    fn on_status(&self, status: Option<StatusMessage>) {
        self.spinner
            .set_message(status.map_or("working", StatusMessage::text));
    }

    fn on_failure(&self, reason: &str) {
        self.spinner.suspend(|| eprintln!("❌ Background removal failed: {}", reason));
    }
}
