//! `ms-tactical` — route planning off the simulation thread.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`planner`] | `TacticalPlanner` (destinations, A*, simplification)        |
//! | [`pool`]    | `TacticalPool`, `PlanRequest`, `PlanResult`                 |
//! | [`config`]  | `PlannerConfig`, `PoolConfig`, `Neighborhood`, `TargetMode` |
//! | [`error`]   | `TacticalError`, `TacticalResult<T>`                        |
//!
//! Planning reads only the immutable [`Terrain`](ms_grid::Terrain):
//! occupancy plays no part in route choice, so workers never see the board
//! the scheduler is mutating.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the config types.       |

pub mod config;
pub mod error;
pub mod planner;
pub mod pool;

#[cfg(test)]
mod tests;

pub use config::{Neighborhood, PlannerConfig, PoolConfig, TargetMode};
pub use error::{TacticalError, TacticalResult};
pub use planner::{
    MAX_SEGMENT_SIZE, PATH_SMOOTHING, SCORE_FACTOR, TacticalPlanner, line_clear,
    nearest_neighbour_chain, simplify,
};
pub use pool::{PlanRequest, PlanResult, TacticalPool};
