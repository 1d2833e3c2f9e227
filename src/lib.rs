#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # ClearCut
//!
//! Orchestration for a single-image background removal workflow: a user
//! drops an image, starts processing, watches progress, and downloads the
//! cut-out as `<name>_clearcut.png`.
//!
//! The workflow is a small state machine. User actions and removal events
//! are fed into [`state::reduce`], which returns the new state plus a list
//! of effects (revoke a preview handle, focus a view, update the status
//! line). [`Session`] owns the state and runs those effects against a
//! [`HandleStore`], a [`BackgroundRemover`] and a [`Presenter`].
//!
//! ## Features
//!
//! - **Single-file intake**: non-images and multi-file drops are ignored
//! - **Phase-aware status**: `fetch:*` progress reads "downloading model",
//!   `compute:inference` reads "processing image"
//! - **Handle hygiene**: every preview and result handle is released exactly once
//! - **Pluggable removers**: an external command, or a scripted mock
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clearcut::{DirectoryTarget, DroppedFile, RunOutcome, ScriptedRemover, Session};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut session = Session::new(Arc::new(ScriptedRemover::new()));
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! session.select_file(DroppedFile::new("photo.jpg", bytes));
//!
//! if let RunOutcome::Done(_) = session.process().await? {
//!     let path = session.download(&DirectoryTarget::new("out"))?;
//!     println!("saved {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, console spinner and tracing setup
//! - `tracing-json`: JSON log output for the CLI

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod handles;
pub mod intake;
pub mod phase;
pub mod presentation;
pub mod removal;
pub mod services;
pub mod session;
pub mod state;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

pub use backends::{create_remover, CommandRemover, ScriptedOutcome, ScriptedRemover};
pub use config::{BackendKind, ClearCutConfig, ClearCutConfigBuilder, CommandConfig, ProgressFormat};
pub use download::{download_file_name, DirectoryTarget, SaveTarget};
pub use error::{ClearCutError, Result};
pub use handles::{HandleStore, ObjectUrl};
pub use phase::{Phase, ProgressEvent, StatusMessage, StatusUpdate};
pub use presentation::{View, ViewModel};
pub use removal::{submit, BackgroundRemover, ProgressCallback, Submission, SubmissionEvent};
#[cfg(feature = "cli")]
pub use services::ConsolePresenter;
pub use services::{FileIntakeService, JsonPresenter, NoOpPresenter, Presenter, RecordingPresenter};
pub use session::{FailureKind, RunFailure, RunOutcome, Session};
pub use state::{reduce, Action, Effect, ProcessingState, Rejection, SessionState, Transition};
pub use types::{Blob, DroppedFile, ImageFile, ProcessedImage};
