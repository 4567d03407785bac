//! Run parameters.

use ms_tactical::{PlannerConfig, PoolConfig};

use crate::{SimError, SimResult};

/// Top-level run configuration.
///
/// `Default` reproduces the historical constants of the mall model: 5000
/// ticks, 4.1 new agents per tick, a crowd cap of 15 % of the accessible
/// cells.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  With `synchronous_routing` the same seed always
    /// produces the same run.
    pub seed: u64,

    /// New agents per tick, accumulated fractionally.
    pub arrival_rate: f64,

    /// Generation stops while `agents / accessible cells` would exceed this.
    pub max_crowd_factor: f64,

    /// An agent closer than this (Euclidean) to its waypoint may snap onto
    /// it, with probability `1 / distance²`.
    pub arrival_radius: f64,

    /// Width of the lane-analysis frame, in cells.
    pub assessment_frame_width: usize,

    /// Agents scattered over free cells before the first tick.  `None` means
    /// one per 250 cells.
    pub initial_agents: Option<usize>,

    /// Call `SimObserver::on_frame` every N ticks.  0 disables frames.
    pub frame_interval_ticks: u64,

    /// Wall-clock pause after every tick, in milliseconds.
    pub tick_delay_ms: u64,

    /// How many times an agent whose planning came back empty is handed to
    /// the planner again before it is retired.
    pub max_plan_attempts: u32,

    /// Wait for every outstanding route at the start of each tick.  Makes
    /// runs reproducible at the cost of stalling on the planner.
    pub synchronous_routing: bool,

    pub planner: PlannerConfig,
    pub pool:    PoolConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:            5000,
            seed:                   0,
            arrival_rate:           4.1,
            max_crowd_factor:       0.15,
            arrival_radius:         2.0,
            assessment_frame_width: 15,
            initial_agents:         None,
            frame_interval_ticks:   0,
            tick_delay_ms:          0,
            max_plan_attempts:      3,
            synchronous_routing:    false,
            planner:                PlannerConfig::default(),
            pool:                   PoolConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(SimError::Config(format!(
                "arrival_rate must be a non-negative number, got {}",
                self.arrival_rate
            )));
        }
        if !(self.max_crowd_factor > 0.0 && self.max_crowd_factor <= 1.0) {
            return Err(SimError::Config(format!(
                "max_crowd_factor must lie in (0, 1], got {}",
                self.max_crowd_factor
            )));
        }
        if !self.arrival_radius.is_finite() || self.arrival_radius < 0.0 {
            return Err(SimError::Config(format!(
                "arrival_radius must be a non-negative number, got {}",
                self.arrival_radius
            )));
        }
        if self.assessment_frame_width == 0 {
            return Err(SimError::Config("assessment_frame_width must be at least 1".into()));
        }
        self.planner.validate()?;
        self.pool.validate()?;
        Ok(())
    }
}
