//! Per-tick speed budgets.

use std::collections::HashMap;

use ms_core::AgentId;
use ms_grid::Board;

/// Moves each agent may still make in the current tick.
///
/// Refilled from every occupant's `v_max` at the start of the Move phase.
/// Agents without an entry (spawned after the refill) have no budget.
#[derive(Debug, Default)]
pub struct SpeedBudgets {
    remaining: HashMap<AgentId, u8>,
}

impl SpeedBudgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every agent on `board` to its profile's `v_max`.
    pub fn refill(&mut self, board: &Board) {
        self.remaining.clear();
        self.remaining.extend(board.agents().map(|a| (a.id(), a.v_max())));
    }

    #[inline]
    pub fn remaining(&self, agent: AgentId) -> u8 {
        self.remaining.get(&agent).copied().unwrap_or(0)
    }

    /// Spend one move.  Returns `false` (and spends nothing) when the agent
    /// is already out of budget.
    pub fn consume(&mut self, agent: AgentId) -> bool {
        match self.remaining.get_mut(&agent) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, agent: AgentId, moves: u8) {
        self.remaining.insert(agent, moves);
    }

    /// Forget a retired agent.
    pub fn remove(&mut self, agent: AgentId) {
        self.remaining.remove(&agent);
    }
}
