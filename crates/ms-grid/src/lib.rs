//! `ms-grid` — venue layout and per-run grid state.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`terrain`] | `Terrain` (immutable tiles), `TerrainBuilder`, `TileKind`   |
//! | [`feature`] | `Feature` (attractor / spawner), `FeatureAction`            |
//! | [`board`]   | `Board` (occupancy, potential field, lanes), `Cell`         |
//! | [`lane`]    | `LaneDirection`                                             |
//! | [`loader`]  | `load_map_files`, `load_map_reader`, `parse_legend`         |
//! | [`error`]   | `GridError`, `GridResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod board;
pub mod error;
pub mod feature;
pub mod lane;
pub mod loader;
pub mod terrain;


pub use board::{Board, Cell};
pub use error::{GridError, GridResult};
pub use feature::{Feature, FeatureAction, PULL_SCALE};
pub use lane::LaneDirection;
pub use loader::{Legend, load_map_files, load_map_reader, parse_legend, sibling_paths};
pub use terrain::{Terrain, TerrainBuilder, Tile, TileKind};
