//! Cell features: attractors and spawners.
//!
//! Features are immutable after load and shared between cells through
//! `Arc<Feature>`; the loader hands out one instance per legend code.

use std::fmt;

use ms_agent::Agent;
use ms_core::FeatureCode;

/// Divisor applied to an attractor's pull when it scales a heuristic score.
pub const PULL_SCALE: i32 = 127;

/// What the caller must do after a feature acted on an agent.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FeatureAction {
    /// Nothing happened.
    None,
    /// The agent was told to stand still for this many sub-steps.
    Hold(u32),
    /// The agent was absorbed and must be taken off the board.
    Absorb,
}

/// A feature placed on a passable cell.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feature {
    /// Makes the cell look cheaper to the planner and holds arriving agents.
    Attractor {
        code:      FeatureCode,
        pull:      i32,
        hold_time: u32,
    },
    /// Entry and exit point.  Agents that walk onto it leave the venue.
    Spawner { code: FeatureCode },
}

impl Feature {
    pub fn attractor(code: char, pull: i32, hold_time: u32) -> Self {
        Feature::Attractor { code: FeatureCode(code), pull, hold_time }
    }

    pub fn spawner(code: char) -> Self {
        Feature::Spawner { code: FeatureCode(code) }
    }

    pub fn code(&self) -> FeatureCode {
        match self {
            Feature::Attractor { code, .. } | Feature::Spawner { code } => *code,
        }
    }

    #[inline]
    pub fn is_spawner(&self) -> bool {
        matches!(self, Feature::Spawner { .. })
    }

    /// Scale an A* heuristic score for a cell carrying this feature.
    ///
    /// Attractors return `pull * score / 127`, so a pull below 127 makes the
    /// cell look closer than it is.  Spawners leave the score alone.
    pub fn modify_heuristic_estimate(&self, score: i32) -> i32 {
        match self {
            Feature::Attractor { pull, .. } => {
                let scaled = i64::from(*pull) * i64::from(score) / i64::from(PULL_SCALE);
                scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
            }
            Feature::Spawner { .. } => score,
        }
    }

    /// Apply the feature's side effect to an agent that just entered the cell.
    ///
    /// A spawner only marks the agent dead; clearing the occupancy is up to
    /// the caller, which owns the board.
    pub fn perform_action(&self, agent: &mut Agent) -> FeatureAction {
        match self {
            Feature::Attractor { hold_time, .. } => {
                agent.set_hold_time(*hold_time);
                FeatureAction::Hold(*hold_time)
            }
            Feature::Spawner { .. } => {
                agent.mark_dead();
                FeatureAction::Absorb
            }
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Attractor { code, pull, hold_time } => {
                write!(f, "attractor {code} (pull {pull}, hold {hold_time})")
            }
            Feature::Spawner { code } => write!(f, "spawner {code}"),
        }
    }
}
