//! `ms-core` — foundational types for the `mallsim` pedestrian simulator.
//!
//! This crate is a dependency of every other `ms-*` crate.  It intentionally
//! has no `ms-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `FeatureCode`                              |
//! | [`geometry`]    | `GridPoint`, `Offset`, `Dir4`, distance helpers       |
//! | [`time`]        | `Tick`                                                |
//! | [`rng`]         | `AgentRng` (per-request), `SimRng` (global)           |
//! | [`error`]       | `MsError`, `MsResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geometry;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{MsError, MsResult};
pub use geometry::{Dir4, GridPoint, Offset};
pub use ids::{AgentId, FeatureCode};
pub use rng::{AgentRng, SimRng};
pub use time::Tick;
