//! Plain data row types written by output backends.

use ms_core::Dir4;
use ms_grid::LaneDirection;
use ms_sim::TickStats;

/// One line of the run log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRow {
    pub tick:             u64,
    pub agents:           usize,
    pub spawned:          usize,
    pub retired:          usize,
    pub successes:        usize,
    pub lane_percentage:  f64,
    pub coherence:        i64,
    pub lost:             usize,
    pub average_progress: f64,
}

impl From<&TickStats> for TickRow {
    fn from(s: &TickStats) -> Self {
        Self {
            tick:             s.tick.0,
            agents:           s.agents,
            spawned:          s.spawned,
            retired:          s.retired,
            successes:        s.successes,
            lane_percentage:  s.lane_percentage,
            coherence:        s.coherence,
            lost:             s.lost,
            average_progress: s.average_progress,
        }
    }
}

/// One occupied cell in a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCellRow {
    pub tick:      u64,
    pub agent_id:  u64,
    pub x:         i32,
    pub y:         i32,
    pub direction: Dir4,
    pub lane:      LaneDirection,
    /// Potential as of the last publish, i.e. after the move phase.
    pub potential: i32,
}
