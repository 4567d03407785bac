//! Grid-subsystem error type.

use thiserror::Error;

use ms_core::{GridPoint, MsError};

/// Errors produced by `ms-grid`.
///
/// The `BlockedCell`, `Occupied`, and `PositivePotential` variants are
/// invariant violations: the board is left as it was at the failing step
/// and the caller is expected to abort the run.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Core(#[from] MsError),

    #[error("cannot place an agent on blocked cell {0}")]
    BlockedCell(GridPoint),

    #[error("cell {0} is already occupied")]
    Occupied(GridPoint),

    #[error("cell {0} has no occupant")]
    Vacant(GridPoint),

    #[error("live potential at {at} became positive ({value})")]
    PositivePotential { at: GridPoint, value: i32 },

    #[error("feature layer is {feature_w}x{feature_h} but terrain is {terrain_w}x{terrain_h}")]
    DimensionMismatch {
        terrain_w: usize,
        terrain_h: usize,
        feature_w: usize,
        feature_h: usize,
    },

    #[error("unknown terrain code {code:?} at {at}")]
    UnknownTerrain { code: char, at: GridPoint },

    #[error("unknown feature code {code:?} at {at}")]
    UnknownFeature { code: char, at: GridPoint },

    #[error("map error: {0}")]
    Map(String),

    #[error("legend error: {0}")]
    Csv(#[from] csv::Error),
}

pub type GridResult<T> = Result<T, GridError>;
