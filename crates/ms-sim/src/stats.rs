//! Per-tick counters and the end-of-run summary.

use ms_analysis::RunningAverage;
use ms_core::Tick;

/// What happened during one tick, measured after the analyze phase.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickStats {
    pub tick:             Tick,
    /// Agents on the board at the end of the tick.
    pub agents:           usize,
    pub spawned:          usize,
    /// Agents removed in the retire phase, unroutable ones included.
    pub retired:          usize,
    /// Agents that reached their final waypoint.
    pub successes:        usize,
    /// Agents removed by stepping onto a spawner.
    pub absorbed:         usize,
    /// Agents retired after running out of planning attempts.
    pub unroutable:       usize,
    pub lane_percentage:  f64,
    pub coherence:        i64,
    pub lost:             usize,
    pub average_progress: f64,
}

/// Totals and running means over a whole run.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Ticks actually simulated.
    pub ticks:            u64,
    /// Seeded plus spawned agents.
    pub total_agents:     usize,
    pub successes:        usize,
    pub absorbed:         usize,
    pub unroutable:       usize,
    /// Agents still on the board.
    pub remaining:        usize,
    pub lane_percentage:  f64,
    pub coherence:        f64,
    pub lost:             f64,
    pub average_progress: f64,
    /// `true` when a [`StopHandle`](crate::StopHandle) ended the run early.
    pub cancelled:        bool,
}

/// Accumulates [`TickStats`] into a [`RunSummary`].
#[derive(Clone, Debug, Default)]
pub(crate) struct RunTotals {
    pub ticks:        u64,
    pub total_agents: usize,
    pub successes:    usize,
    pub absorbed:     usize,
    pub unroutable:   usize,
    lane_percentage:  RunningAverage,
    coherence:        RunningAverage,
    lost:             RunningAverage,
    progress:         RunningAverage,
}

impl RunTotals {
    pub fn record(&mut self, stats: &TickStats) {
        self.ticks        += 1;
        self.total_agents += stats.spawned;
        self.successes    += stats.successes;
        self.absorbed     += stats.absorbed;
        self.unroutable   += stats.unroutable;
        self.lane_percentage.add(stats.lane_percentage);
        self.coherence.add(stats.coherence as f64);
        self.lost.add(stats.lost as f64);
        self.progress.add(stats.average_progress);
    }

    pub fn summary(&self, remaining: usize, cancelled: bool) -> RunSummary {
        RunSummary {
            ticks:            self.ticks,
            total_agents:     self.total_agents,
            successes:        self.successes,
            absorbed:         self.absorbed,
            unroutable:       self.unroutable,
            remaining,
            lane_percentage:  self.lane_percentage.mean(),
            coherence:        self.coherence.mean(),
            lost:             self.lost.mean(),
            average_progress: self.progress.mean(),
            cancelled,
        }
    }
}
