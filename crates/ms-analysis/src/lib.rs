//! `ms-analysis` — read-mostly analytics over the board.
//!
//! # Crate layout
//!
//! | Module   | Contents                                                     |
//! |----------|--------------------------------------------------------------|
//! | [`lane`] | `LaneAnalyzer`, `LaneStats`, `lane_percentage`, `coherence`  |
//! | [`flow`] | `FlowStats`, `flow_stats`, `RunningAverage`                  |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Classifies rows on Rayon's thread pool.                   |
//! | `serde`    | Derives `Serialize`/`Deserialize` on the stats types.     |

pub mod flow;
pub mod lane;


pub use flow::{FlowStats, RunningAverage, flow_stats};
pub use lane::{DENSITY_LIMIT, DIRECTION_THRESHOLD, LaneAnalyzer, LaneStats, coherence, lane_percentage};
