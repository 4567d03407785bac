//! Per-tick crowd diagnostics and sample-weighted running means.

use ms_grid::Board;

/// How well the agents currently on the board are getting along.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowStats {
    /// Agents that revisited some cell more than twice since their last waypoint.
    pub lost:             usize,
    /// Mean `progress_ratio()`; `1.0` on an empty board.
    pub average_progress: f64,
}

impl Default for FlowStats {
    fn default() -> Self {
        Self { lost: 0, average_progress: 1.0 }
    }
}

pub fn flow_stats(board: &Board) -> FlowStats {
    let mut agents = 0usize;
    let mut lost = 0usize;
    let mut progress = 0.0;
    for agent in board.agents() {
        agents += 1;
        if agent.is_lost() {
            lost += 1;
        }
        progress += agent.progress_ratio();
    }
    if agents == 0 {
        return FlowStats::default();
    }
    FlowStats { lost, average_progress: progress / agents as f64 }
}

// ── RunningAverage ────────────────────────────────────────────────────────────

/// Arithmetic mean over every sample added so far.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunningAverage {
    sum:   f64,
    count: u64,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sample: f64) {
        self.sum += sample;
        self.count += 1;
    }

    /// `0.0` before the first sample.
    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.sum / self.count as f64 }
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }
}
