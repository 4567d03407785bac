//! Four-neighbour stepping with head-on swaps.

use ms_agent::Agent;
use ms_core::{GridPoint, SimRng};
use ms_grid::{Board, GridResult};
use tracing::trace;

use crate::algorithm::{directions_toward, pending_target, step_into};
use crate::{MovementAlgorithm, SpeedBudgets, StepOutcome};

/// Walks along the axis with the larger remaining distance, falling back to
/// the other axis when blocked.
///
/// Two agents meeting head-on may trade places: the mover succeeds with
/// probability equal to its agility, provided the oncoming agent still has
/// budget left this tick.  The swap charges the oncoming agent one move.
pub struct Ped4;

impl MovementAlgorithm for Ped4 {
    fn prepare(&self, board: &mut Board, at: GridPoint) -> GridResult<()> {
        let Some(target) = pending_target(board, at) else {
            return Ok(());
        };
        if let Some(dir) = directions_toward(at, target).next() {
            board.set_direction(at, dir)?;
        }
        Ok(())
    }

    fn next_iteration_step(
        &self,
        board:   &mut Board,
        at:      GridPoint,
        budgets: &mut SpeedBudgets,
        rng:     &mut SimRng,
    ) -> GridResult<StepOutcome> {
        let Some(target) = pending_target(board, at) else {
            return Ok(StepOutcome::Idle);
        };
        let agility = board.agent(at).map_or(0.0, Agent::agility);

        for dir in directions_toward(at, target) {
            let to = at.step(dir);
            if board.is_free(to) {
                return step_into(board, at, dir).map(StepOutcome::Moved);
            }

            let Some(other) = board.agent(to) else { continue };
            let other_id = other.id();
            if other.direction() != dir.opposite() || budgets.remaining(other_id) == 0 {
                continue;
            }
            if !rng.gen_bool(agility) {
                continue;
            }

            board.set_direction(at, dir)?;
            board.swap_agents(at, to)?;
            budgets.consume(other_id);
            for p in [at, to] {
                if let Some(agent) = board.agent_mut(p) {
                    agent.increment_fields_moved();
                }
            }
            trace!(%at, %to, "head-on swap");
            return Ok(StepOutcome::Swapped(to));
        }

        Ok(StepOutcome::Blocked)
    }
}
