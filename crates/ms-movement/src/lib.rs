//! `ms-movement` — how agents take single steps across the grid.
//!
//! # Crate layout
//!
//! | Module           | Contents                                               |
//! |------------------|--------------------------------------------------------|
//! | [`algorithm`]    | `MovementAlgorithm` trait, `StepOutcome`, dispatch     |
//! | [`budget`]       | `SpeedBudgets` (per-tick remaining moves)              |
//! | [`ped4`]         | `Ped4` (axis-first stepping with head-on swaps)        |
//! | [`social_force`] | `SocialForce` (potential-weighted neighbour choice)    |
//! | [`stationary`]   | `Stationary` (never moves)                             |
//!
//! Which algorithm drives an agent depends on the tile it currently stands
//! on; [`algorithm_for`] maps a [`TileKind`](ms_grid::TileKind) to a shared
//! static instance.

pub mod algorithm;
pub mod budget;
pub mod ped4;
pub mod social_force;
pub mod stationary;


pub use algorithm::{MovementAlgorithm, StepOutcome, algorithm_for};
pub use budget::SpeedBudgets;
pub use ped4::Ped4;
pub use social_force::SocialForce;
pub use stationary::Stationary;
