//! The `OutputWriter` trait implemented by all backend writers.

use crate::{FrameCellRow, OutputResult, TickRow};

/// Trait implemented by the CSV writers.
///
/// A backend that records only one kind of row leaves the other method as
/// the default no-op.  Two writers combine as a tuple.
pub trait OutputWriter {
    /// Write one run-log row.
    fn write_tick(&mut self, _row: &TickRow) -> OutputResult<()> {
        Ok(())
    }

    /// Write every occupied cell of one frame.
    fn write_frame(&mut self, _rows: &[FrameCellRow]) -> OutputResult<()> {
        Ok(())
    }

    /// Flush and close all underlying file handles.
    ///
    /// Calling it again is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<A: OutputWriter, B: OutputWriter> OutputWriter for (A, B) {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        self.0.write_tick(row)?;
        self.1.write_tick(row)
    }

    fn write_frame(&mut self, rows: &[FrameCellRow]) -> OutputResult<()> {
        self.0.write_frame(rows)?;
        self.1.write_frame(rows)
    }

    fn finish(&mut self) -> OutputResult<()> {
        let first = self.0.finish();
        self.1.finish()?;
        first
    }
}
