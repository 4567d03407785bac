//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use ms_core::{GridPoint, Tick};
use ms_grid::{Board, LaneDirection};
use ms_sim::{RunSummary, SimObserver, TickStats};

use crate::row::{FrameCellRow, TickRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes the run log and recorded frames to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

/// Every occupied cell of `board`, row-major.
pub fn frame_rows(tick: Tick, board: &Board) -> Vec<FrameCellRow> {
    board
        .occupied_points()
        .into_iter()
        .filter_map(|p: GridPoint| {
            let agent = board.agent(p)?;
            Some(FrameCellRow {
                tick:      tick.0,
                agent_id:  agent.id().0,
                x:         p.x,
                y:         p.y,
                direction: agent.direction(),
                lane:      board.lane(p).unwrap_or(LaneDirection::Empty),
                potential: board.potential_render(p).unwrap_or(0),
            })
        })
        .collect()
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, stats: &TickStats) {
        let result = self.writer.write_tick(&TickRow::from(stats));
        self.store_err(result);
    }

    fn on_frame(&mut self, tick: Tick, board: &Board) {
        let rows = frame_rows(tick, board);
        let result = self.writer.write_frame(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _summary: &RunSummary) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
