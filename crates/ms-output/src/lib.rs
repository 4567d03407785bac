//! `ms-output` — CSV writers for mallsim runs.
//!
//! | Writer             | File           | Rows                                  |
//! |--------------------|----------------|---------------------------------------|
//! | [`CsvRunLog`]      | `run_log.csv`  | one per tick                          |
//! | [`CsvFrameWriter`] | `frames.csv`   | one per occupied cell per frame       |
//!
//! Both implement [`OutputWriter`]; a tuple of two writers is a writer too.
//! [`SimOutputObserver`] implements `ms_sim::SimObserver` and feeds ticks and
//! frames to its writer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ms_output::{CsvFrameWriter, CsvRunLog, SimOutputObserver};
//!
//! let writer = (CsvRunLog::new(dir)?, CsvFrameWriter::new(dir)?);
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { eprintln!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use self::csv::{CsvFrameWriter, CsvRunLog, FRAMES_FILE, RUN_LOG_FILE};
pub use error::{OutputError, OutputResult};
pub use observer::{SimOutputObserver, frame_rows};
pub use row::{FrameCellRow, TickRow};
pub use writer::OutputWriter;
