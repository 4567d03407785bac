//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `MsError` as one
//! variant; `MsError` covers the few failures shared by every layer
//! (bounds checks, text parsing, raw I/O).

use thiserror::Error;

use crate::GridPoint;

#[derive(Debug, Error)]
pub enum MsError {
    #[error("point {0} is outside the board")]
    OffBoard(GridPoint),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for core helpers.
pub type MsResult<T> = Result<T, MsError>;
