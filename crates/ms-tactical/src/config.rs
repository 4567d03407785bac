//! Planner and worker-pool parameters.

use ms_core::Offset;

use crate::{SCORE_FACTOR, TacticalError, TacticalResult};

// ── Neighborhood ──────────────────────────────────────────────────────────────

/// Which cells A* treats as adjacent.  Every step costs the same.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Neighborhood {
    /// 4-connected.
    VonNeumann,
    /// 8-connected.
    #[default]
    Moore,
}

const VON_NEUMANN: [Offset; 4] = [
    Offset::new(0, -1),
    Offset::new(-1, 0),
    Offset::new(1, 0),
    Offset::new(0, 1),
];

const MOORE: [Offset; 8] = [
    Offset::new(-1, -1),
    Offset::new(0, -1),
    Offset::new(1, -1),
    Offset::new(-1, 0),
    Offset::new(1, 0),
    Offset::new(-1, 1),
    Offset::new(0, 1),
    Offset::new(1, 1),
];

impl Neighborhood {
    /// Neighbour offsets in row-major order.
    pub fn offsets(self) -> &'static [Offset] {
        match self {
            Neighborhood::VonNeumann => &VON_NEUMANN,
            Neighborhood::Moore      => &MOORE,
        }
    }
}

// ── TargetMode ────────────────────────────────────────────────────────────────

/// How many destinations one planning request visits.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetMode {
    /// One I/O point or attractor, drawn at random.
    #[default]
    Single,
    /// `min..=max` random passable cells chained nearest-first.
    Tour { min: usize, max: usize },
}

impl TargetMode {
    /// Tour bounds used when none are configured: 1 to 14 destinations.
    pub const DEFAULT_TOUR: TargetMode = TargetMode::Tour { min: 1, max: 14 };
}

// ── PlannerConfig ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Multiplier on the Euclidean heuristic.  `1` keeps A* admissible on a
    /// 4-connected grid; larger values trade optimality for speed.
    pub heuristic_factor:    i32,
    pub neighborhood:        Neighborhood,
    pub target_mode:         TargetMode,
    /// Single-mode destinations closer than this (Euclidean) are skipped.
    pub min_target_distance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            heuristic_factor:    5,
            neighborhood:        Neighborhood::Moore,
            target_mode:         TargetMode::Single,
            min_target_distance: 10.0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> TacticalResult<()> {
        if self.heuristic_factor < 0 || SCORE_FACTOR.checked_mul(self.heuristic_factor).is_none() {
            return Err(TacticalError::Config(format!(
                "heuristic_factor must be in 0..={}, got {}",
                i32::MAX / SCORE_FACTOR,
                self.heuristic_factor
            )));
        }
        if !self.min_target_distance.is_finite() || self.min_target_distance < 0.0 {
            return Err(TacticalError::Config(format!(
                "min_target_distance must be a non-negative number, got {}",
                self.min_target_distance
            )));
        }
        if let TargetMode::Tour { min, max } = self.target_mode {
            if min == 0 || min > max {
                return Err(TacticalError::Config(format!(
                    "tour bounds must satisfy 1 <= min <= max, got {min}..={max}"
                )));
            }
        }
        Ok(())
    }
}

// ── PoolConfig ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Number of planner threads.
    pub workers:        usize,
    /// Capacity of the request queue.  Kept small so a busy pool throttles
    /// agent generation.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 4, queue_capacity: 5 }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> TacticalResult<()> {
        if self.workers == 0 {
            return Err(TacticalError::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(TacticalError::Config("queue_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
