//! Simulation observer trait for rendering, recording and progress reporting.

use ms_core::Tick;
use ms_grid::Board;

use crate::{RunSummary, TickStats};

/// Externally visible points inside a tick at which the board is consistent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Every routed agent faces its next step; the render potential is fresh.
    Prepare,
    /// All sub-steps of the move phase are done.
    Move,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] and
/// [`Sim::step`][crate::Sim::step] on the scheduler thread.
///
/// All methods have default no-op implementations.  The board is lent
/// read-only; anything slow (disk, encoding) should copy what it needs and
/// return, since the scheduler waits for every callback.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
///         if tick.is_every(100) {
///             println!("{tick}: {} agents, {:.1}% lanes", stats.agents, stats.lane_percentage);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per [`Phase`] per tick, after that phase's mutations.
    fn on_phase(&mut self, _tick: Tick, _phase: Phase, _board: &Board) {}

    /// Called after the analyze phase with the tick's counters.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called every `config.frame_interval_ticks` ticks, after `on_tick_end`.
    fn on_frame(&mut self, _tick: Tick, _board: &Board) {}

    /// Called once when the run finishes or is stopped.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
