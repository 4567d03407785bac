//! Potential-weighted neighbour choice.
//!
//! Each free neighbour is scored by how much closer it brings the agent to
//! its waypoint, minus the crowd pressure other agents exert on it:
//!
//! ```text
//! score = (d(here, target) - d(next, target)) + PRESSURE_WEIGHT * potential'(next)
//! ```
//!
//! where `potential'` is the live field with the mover's own template
//! removed.  Moves that head away from the waypoint (distance reduction
//! below `-0.5`) are never considered, so sidesteps are allowed but
//! retreats are not.

use ms_core::{Dir4, GridPoint, SimRng};
use ms_grid::{Board, GridResult};

use crate::algorithm::{pending_target, step_into};
use crate::{MovementAlgorithm, SpeedBudgets, StepOutcome};

/// Weight of one unit of (negative) potential against one cell of progress.
pub const PRESSURE_WEIGHT: f64 = 0.1;

const MIN_PROGRESS: f64 = -0.5;

/// Steers around crowded cells.  Never swaps.
pub struct SocialForce;

impl SocialForce {
    /// Best free neighbour direction, if any qualifies.
    pub fn choose_direction(board: &Board, at: GridPoint, target: GridPoint) -> Option<Dir4> {
        let here = at.distance(target);
        let mut best: Option<(f64, Dir4)> = None;

        for dir in Dir4::ALL {
            let next = at.step(dir);
            if !board.is_free(next) {
                continue;
            }
            let progress = here - next.distance(target);
            if progress < MIN_PROGRESS {
                continue;
            }
            let pressure = board.potential_excluding(next, at).unwrap_or(0) as f64;
            let score = progress + PRESSURE_WEIGHT * pressure;
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, dir));
            }
        }
        best.map(|(_, dir)| dir)
    }
}

impl MovementAlgorithm for SocialForce {
    fn prepare(&self, board: &mut Board, at: GridPoint) -> GridResult<()> {
        let Some(target) = pending_target(board, at) else {
            return Ok(());
        };
        match Self::choose_direction(board, at, target) {
            Some(dir) => board.set_direction(at, dir),
            None => Ok(()),
        }
    }

    fn next_iteration_step(
        &self,
        board:    &mut Board,
        at:       GridPoint,
        _budgets: &mut SpeedBudgets,
        _rng:     &mut SimRng,
    ) -> GridResult<StepOutcome> {
        let Some(target) = pending_target(board, at) else {
            return Ok(StepOutcome::Idle);
        };
        match Self::choose_direction(board, at, target) {
            Some(dir) => step_into(board, at, dir).map(StepOutcome::Moved),
            None => Ok(StepOutcome::Blocked),
        }
    }
}
