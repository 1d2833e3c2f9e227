//! Background remover implementations

pub mod command;
pub mod mock;

pub use command::CommandRemover;
pub use mock::{ScriptedOutcome, ScriptedRemover};

use crate::config::{BackendKind, ClearCutConfig};
use crate::removal::BackgroundRemover;
use std::sync::Arc;

/// Model name reported by the scripted remover's cold start
const MOCK_MODEL: &str = "/models/medium";
const MOCK_FETCH_CHUNKS: u64 = 4;

/// Create the remover selected by `config`
#[must_use]
pub fn create_remover(config: &ClearCutConfig) -> Arc<dyn BackgroundRemover> {
    match config.backend {
        BackendKind::Command => Arc::new(CommandRemover::from_config(&config.command)),
        BackendKind::Mock => Arc::new(ScriptedRemover::cold_start(MOCK_MODEL, MOCK_FETCH_CHUNKS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_backend() {
        let config = ClearCutConfig::builder().backend(BackendKind::Mock).build().unwrap();
        assert_eq!(create_remover(&config).name(), "mock");

        let config = ClearCutConfig::default();
        assert_eq!(create_remover(&config).name(), "command");
    }
}
