use ms_core::Tick;
use ms_grid::GridError;
use ms_tactical::TacticalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    /// The board reached a state the model forbids.  The run is aborted and
    /// the board should not be trusted afterwards.
    #[error("grid invariant violated during {tick}: {source}")]
    Invariant {
        tick:   Tick,
        #[source]
        source: GridError,
    },

    #[error(transparent)]
    Tactical(#[from] TacticalError),

    #[error("the run has already finished")]
    Finished,
}

pub type SimResult<T> = Result<T, SimError>;
