//! The `MovementAlgorithm` trait and tile-kind dispatch.

use ms_core::{Dir4, GridPoint, SimRng};
use ms_grid::{Board, GridResult, TileKind};

use crate::{Ped4, SocialForce, SpeedBudgets, Stationary};

/// Result of one [`MovementAlgorithm::next_iteration_step`] call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    /// Nothing to do: no agent, no waypoint, or already on it.
    Idle,
    /// Every candidate cell was taken or walled off.
    Blocked,
    /// The agent entered the given empty cell.
    Moved(GridPoint),
    /// The agent traded places with the occupant of the given cell, which
    /// now stands where the mover stood.
    Swapped(GridPoint),
}

/// Pluggable single-cell movement policy, attached to tiles.
///
/// # Contract
///
/// * `prepare` runs once per tick for every agent that has a waypoint and is
///   not standing on it.  It may only change the agent's facing.
/// * `next_iteration_step` attempts at most one transition for the agent at
///   `at`.  Implementations mutate occupancy only through the `Board`
///   helpers, so the potential field stays consistent, and charge any other
///   agent they displace through `budgets`.  The mover's own budget is
///   charged by the caller.
///
/// Errors are grid invariant violations and abort the run.
pub trait MovementAlgorithm: Send + Sync + 'static {
    fn prepare(&self, board: &mut Board, at: GridPoint) -> GridResult<()>;

    fn next_iteration_step(
        &self,
        board:   &mut Board,
        at:      GridPoint,
        budgets: &mut SpeedBudgets,
        rng:     &mut SimRng,
    ) -> GridResult<StepOutcome>;
}

static PED4: Ped4 = Ped4;
static SOCIAL_FORCE: SocialForce = SocialForce;
static STATIONARY: Stationary = Stationary;

/// The algorithm that drives agents standing on a tile of `kind`.
pub fn algorithm_for(kind: TileKind) -> &'static dyn MovementAlgorithm {
    match kind {
        TileKind::Ped4        => &PED4,
        TileKind::SocialForce => &SOCIAL_FORCE,
        TileKind::Wall        => &STATIONARY,
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Up to two directions that reduce the distance from `from` to `to`,
/// the axis with the larger remaining distance first.  Ties go to the
/// horizontal axis.
pub(crate) fn directions_toward(from: GridPoint, to: GridPoint) -> impl Iterator<Item = Dir4> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let horizontal = match dx.signum() {
        1  => Some(Dir4::E),
        -1 => Some(Dir4::W),
        _  => None,
    };
    let vertical = match dy.signum() {
        1  => Some(Dir4::S),
        -1 => Some(Dir4::N),
        _  => None,
    };
    let (first, second) = if dx.abs() >= dy.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };
    first.into_iter().chain(second)
}

/// The active waypoint of the agent at `at`, unless there is no agent, no
/// waypoint, or the agent already stands on it.
pub(crate) fn pending_target(board: &Board, at: GridPoint) -> Option<GridPoint> {
    let agent = board.agent(at)?;
    agent.target().filter(|&t| t != agent.position())
}

/// Turn toward `dir` and walk into the empty cell there.
pub(crate) fn step_into(board: &mut Board, at: GridPoint, dir: Dir4) -> GridResult<GridPoint> {
    let to = at.step(dir);
    board.set_direction(at, dir)?;
    board.move_agent(at, to)?;
    if let Some(agent) = board.agent_mut(to) {
        agent.increment_fields_moved();
    }
    Ok(to)
}
