use thiserror::Error;

use crate::registry::GameKey;
use arcade_engine::EngineBootError;

/// A mini-game could not be resolved to a runnable module.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    #[error("no game registered for key {0}")]
    Unregistered(GameKey),
    #[error("shared 3D engine failed to load: {0}")]
    Engine(String),
}

impl From<&EngineBootError> for ModuleLoadError {
    fn from(err: &EngineBootError) -> Self {
        ModuleLoadError::Engine(err.to_string())
    }
}

/// A failure talking to the persistence service. Always recovered locally:
/// the computed score is still surfaced to the player.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("persistence rejected the payload: {status} {message}")]
    Rejected { status: u16, message: String },
}
