//! `ms-sim` — tick scheduler for the mallsim pedestrian simulator.
//!
//! # Tick loop
//!
//! ```text
//! seed:  scatter initial agents, queue a route for each
//! for tick in 0..config.total_ticks:
//!   ① Collect   — apply finished routes from the TacticalPool
//!   ② Generate  — spawn on free I/O points under the crowd cap; submit
//!                 (blocks while the bounded queue is full)
//!   ③ Arrival   — pop reached waypoints (exact, or 1/d² snap within radius)
//!   ④ Prepare   — movement algorithm picks a facing      → on_phase(Prepare)
//!   ⑤ Move      — V_MAX row-major sub-steps under speed budgets,
//!                 feature actions on entered cells       → on_phase(Move)
//!   ⑥ Retire    — drop finished agents, re-queue unroutable ones
//!   ⑦ Analyze   — lanes, coherence, lost, progress       → on_tick_end
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs lane classification on Rayon's thread pool.       |
//! | `fx-hash`  | FxHash for the per-sub-step moved-agent set.           |
//! | `serde`    | Serialize/Deserialize on config and statistics.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ms_grid::{Board, load_map_files};
//! use ms_sim::{NoopObserver, SimBuilder, SimConfig};
//!
//! let terrain = Arc::new(load_map_files("maps/mall_map.txt")?);
//! let mut sim = SimBuilder::new(SimConfig::default(), Board::new(terrain)).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod sim;
pub mod stats;


pub use builder::SimBuilder;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, Phase, SimObserver};
pub use sim::{RunState, SEED_CELLS_PER_AGENT, Sim, StopHandle};
pub use stats::{RunSummary, TickStats};
