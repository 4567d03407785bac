//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use tracing::warn;

use ms_grid::Board;
use ms_tactical::{TacticalPlanner, TacticalPool};

use crate::{Sim, SimConfig, SimError, SimResult, StopHandle};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: ticks, seed, rates, planner and pool settings
/// - [`Board`]: usually fresh from [`ms_grid::load_map_files`]; agents
///   already on it join the run and are routed during seeding unless they
///   carry a route
///
/// # Optional inputs
///
/// | Method              | Default             |
/// |---------------------|---------------------|
/// | `.stop_handle(h)`   | A fresh handle      |
///
/// # Example
///
/// ```rust,ignore
/// let terrain = ms_grid::load_map_files("maps/mall_map.txt")?;
/// let mut sim = SimBuilder::new(SimConfig::default(), Board::new(Arc::new(terrain)))
///     .build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
    board:  Board,
    stop:   Option<StopHandle>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, board: Board) -> Self {
        Self { config, board, stop: None }
    }

    /// Share a stop handle created elsewhere, e.g. by a signal handler.
    pub fn stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Validate the configuration, start the tactical worker pool and return
    /// an idle [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        if self.board.accessible_field_count() == 0 {
            return Err(SimError::Config("the map has no accessible cells".into()));
        }
        if self.board.io_points().is_empty() && self.config.arrival_rate > 0.0 {
            warn!("the map has no I/O points; no agents will be generated");
        }

        let planner = Arc::new(TacticalPlanner::new(self.config.planner.clone()));
        let terrain = Arc::clone(self.board.terrain());
        let pool = TacticalPool::spawn(&self.config.pool, planner, terrain)?;

        Ok(Sim::new(self.config, self.board, pool, self.stop.unwrap_or_default()))
    }
}
