//! `ms-agent` — per-pedestrian state for the `mallsim` simulator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`agent`]     | `Agent` (route, speed budget source, hold timer, histogram) |
//! | [`profile`]   | `MovementProfile` (vMax / agility presets), `V_MAX`         |
//! | [`force`]     | `FORCE_TEMPLATE`, `rotated_template`                        |
//! | [`builder`]   | `AgentBuilder` (fluent construction)                        |
//!
//! An `Agent` knows its position but never holds a reference into the grid;
//! the board owns occupancy and calls back into the agent when it moves.

pub mod agent;
pub mod builder;
pub mod force;
pub mod profile;


pub use agent::{Agent, LOST_VISIT_THRESHOLD, PlanState};
pub use builder::AgentBuilder;
pub use force::{FORCE_TEMPLATE, ForceEntry, force_at, rotated_template};
pub use profile::{MovementProfile, V_MAX};
