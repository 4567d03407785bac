//! CSV output backends.
//!
//! - [`CsvRunLog`] writes `run_log.csv`, one row per tick.
//! - [`CsvFrameWriter`] writes `frames.csv`, one row per occupied cell per
//!   recorded frame.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{FrameCellRow, OutputResult, TickRow};

pub const RUN_LOG_FILE: &str = "run_log.csv";
pub const FRAMES_FILE: &str = "frames.csv";

// ── CsvRunLog ─────────────────────────────────────────────────────────────────

/// Per-tick statistics as CSV.
pub struct CsvRunLog {
    out:      Writer<File>,
    finished: bool,
}

impl CsvRunLog {
    /// Create `run_log.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut out = Writer::from_path(dir.join(RUN_LOG_FILE))?;
        out.write_record([
            "tick",
            "agents",
            "spawned",
            "retired",
            "successes",
            "lane_percentage",
            "coherence",
            "lost",
            "average_progress",
        ])?;
        Ok(Self { out, finished: false })
    }
}

impl OutputWriter for CsvRunLog {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        self.out.write_record(&[
            row.tick.to_string(),
            row.agents.to_string(),
            row.spawned.to_string(),
            row.retired.to_string(),
            row.successes.to_string(),
            format!("{:.3}", row.lane_percentage),
            row.coherence.to_string(),
            row.lost.to_string(),
            format!("{:.3}", row.average_progress),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}

// ── CsvFrameWriter ────────────────────────────────────────────────────────────

/// Recorded frames as CSV, in row-major cell order within a frame.
pub struct CsvFrameWriter {
    out:      Writer<File>,
    frames:   u64,
    finished: bool,
}

impl CsvFrameWriter {
    /// Create `frames.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut out = Writer::from_path(dir.join(FRAMES_FILE))?;
        out.write_record(["tick", "agent_id", "x", "y", "direction", "lane", "potential"])?;
        Ok(Self { out, frames: 0, finished: false })
    }

    /// Frames written so far, empty ones included.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl OutputWriter for CsvFrameWriter {
    fn write_frame(&mut self, rows: &[FrameCellRow]) -> OutputResult<()> {
        for row in rows {
            self.out.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.direction.as_str().to_owned(),
                row.lane.as_str().to_owned(),
                row.potential.to_string(),
            ])?;
        }
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
