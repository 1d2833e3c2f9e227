//! Presentation model
//!
//! Two mutually exclusive views show the original upload and the processed
//! result. [`ViewModel`] is a pure projection of [`SessionState`] that a
//! frontend renders without consulting the state machine itself.

use crate::handles::ObjectUrl;
use crate::state::SessionState;
use serde::Serialize;
use std::fmt;

/// The two views of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Original,
    Processed,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Processed => write!(f, "processed"),
        }
    }
}

/// Content of the "original" view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalPane {
    pub preview: Option<ObjectUrl>,
    pub file_name: Option<String>,
    /// Busy overlay drawn over the preview while processing
    pub busy_overlay: bool,
    pub status_text: Option<&'static str>,
}

/// Content of the "processed" view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedPane {
    pub result: Option<ObjectUrl>,
    /// The tab cannot be chosen until a result exists
    pub selectable: bool,
}

/// Everything a frontend needs to render a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub active_view: View,
    pub original: OriginalPane,
    pub processed: ProcessedPane,
    /// "Remove background" trigger
    pub trigger_enabled: bool,
    pub download_enabled: bool,
    /// Reason of the last failed run, for frontends that surface it
    pub failure: Option<String>,
}

impl ViewModel {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        let selected = state.selected();
        let result = state.result().cloned();

        Self {
            active_view: state.active_view(),
            original: OriginalPane {
                preview: selected.map(|s| s.preview.clone()),
                file_name: selected.map(|s| s.file.name().to_string()),
                busy_overlay: state.is_busy(),
                status_text: state.status().map(|s| s.text()),
            },
            processed: ProcessedPane {
                selectable: result.is_some(),
                result,
            },
            trigger_enabled: state.can_start(),
            download_enabled: state.result().is_some(),
            failure: state.failure_reason().map(str::to_string),
        }
    }
}
