// Domain-level errors for the barrage engine.

use thiserror::Error;

/// Failures reported by a puppet; the engine logs them and keeps simulating.
#[derive(Debug, Error)]
pub enum PuppetError {
    #[error("puppet is not spawned")]
    NotSpawned,
    #[error("puppet was already cancelled")]
    Cancelled,
    #[error("puppet backend failed: {0}")]
    Backend(String),
}
