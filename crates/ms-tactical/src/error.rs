//! Tactical-subsystem error type.
//!
//! "No path" is not an error: the planner returns an empty route.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TacticalError {
    #[error("tactical pool is closed")]
    PoolClosed,

    #[error("invalid tactical configuration: {0}")]
    Config(String),

    #[error("failed to spawn tactical worker: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type TacticalResult<T> = Result<T, TacticalError>;
