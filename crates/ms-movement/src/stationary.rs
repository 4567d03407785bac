//! The algorithm of blocked tiles.

use ms_core::{GridPoint, SimRng};
use ms_grid::{Board, GridResult};

use crate::{MovementAlgorithm, SpeedBudgets, StepOutcome};

/// Never moves anyone.  Agents cannot stand on walls, so this only runs if
/// a host asks a wall tile for its algorithm.
pub struct Stationary;

impl MovementAlgorithm for Stationary {
    fn prepare(&self, _board: &mut Board, _at: GridPoint) -> GridResult<()> {
        Ok(())
    }

    fn next_iteration_step(
        &self,
        _board:   &mut Board,
        _at:      GridPoint,
        _budgets: &mut SpeedBudgets,
        _rng:     &mut SimRng,
    ) -> GridResult<StepOutcome> {
        Ok(StepOutcome::Idle)
    }
}
