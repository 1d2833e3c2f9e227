//! Services separating I/O and rendering from the session state machine

pub mod io;
pub mod progress;

pub use io::FileIntakeService;
#[cfg(feature = "cli")]
pub use progress::ConsolePresenter;
pub use progress::{JsonPresenter, NoOpPresenter, Presenter, PresenterEvent, RecordingPresenter};
