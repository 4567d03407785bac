//! The `Agent` struct — one pedestrian's route and movement state.

use std::collections::{HashMap, VecDeque};

use ms_core::{AgentId, Dir4, GridPoint};

use crate::MovementProfile;

/// An agent that has entered any single cell more than this many times since
/// it last reached a waypoint is reported as lost.
pub const LOST_VISIT_THRESHOLD: u32 = 2;

/// Where the agent stands with respect to the tactical worker pool.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanState {
    /// Never submitted for planning.
    #[default]
    Idle,
    /// Submitted; a route result has not been applied yet.
    Pending,
    /// The last planning result produced a non-empty route.
    Routed,
    /// The last planning result was "no path".
    Unroutable,
}

/// A pedestrian.
///
/// `route.front()` is the active waypoint; an empty route means no pending
/// target.  Every mutator bumps [`revision`](Self::revision) so renderers
/// can tell whether anything changed since they last looked.
#[derive(Clone, Debug)]
pub struct Agent {
    id:                         AgentId,
    profile:                    MovementProfile,
    position:                   GridPoint,
    direction:                  Dir4,
    route:                      VecDeque<GridPoint>,
    fields_moved:               u32,
    initial_distance_to_target: f64,
    hold_time:                  u32,
    is_dead:                    bool,
    plan_state:                 PlanState,
    plan_attempts:              u32,
    /// Cells entered since the last reached waypoint.
    visits:                     HashMap<GridPoint, u32>,
    revision:                   u64,
}

impl Agent {
    pub fn new(id: AgentId, profile: MovementProfile) -> Self {
        Self {
            id,
            profile,
            position: GridPoint::default(),
            direction: Dir4::N,
            route: VecDeque::new(),
            fields_moved: 0,
            initial_distance_to_target: 0.0,
            hold_time: 0,
            is_dead: false,
            plan_state: PlanState::Idle,
            plan_attempts: 0,
            visits: HashMap::new(),
            revision: 0,
        }
    }

    // ── Read accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn profile(&self) -> MovementProfile {
        self.profile
    }

    /// Per-tick speed budget.
    #[inline]
    pub fn v_max(&self) -> u8 {
        self.profile.v_max()
    }

    #[inline]
    pub fn agility(&self) -> f64 {
        self.profile.agility()
    }

    #[inline]
    pub fn position(&self) -> GridPoint {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Dir4 {
        self.direction
    }

    #[inline]
    pub fn route(&self) -> &VecDeque<GridPoint> {
        &self.route
    }

    /// The active waypoint, if any.
    #[inline]
    pub fn target(&self) -> Option<GridPoint> {
        self.route.front().copied()
    }

    #[inline]
    pub fn target_count(&self) -> usize {
        self.route.len()
    }

    #[inline]
    pub fn fields_moved(&self) -> u32 {
        self.fields_moved
    }

    #[inline]
    pub fn initial_distance_to_target(&self) -> f64 {
        self.initial_distance_to_target
    }

    #[inline]
    pub fn hold_time(&self) -> u32 {
        self.hold_time
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    #[inline]
    pub fn plan_state(&self) -> PlanState {
        self.plan_state
    }

    /// Number of planning requests submitted for this agent so far.
    #[inline]
    pub fn plan_attempts(&self) -> u32 {
        self.plan_attempts
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// How many times `p` was entered since the last reached waypoint.
    pub fn visit_count(&self, p: GridPoint) -> u32 {
        self.visits.get(&p).copied().unwrap_or(0)
    }

    /// Read-only diagnostic: has the agent been going round in circles?
    pub fn is_lost(&self) -> bool {
        self.visits.values().any(|&n| n > LOST_VISIT_THRESHOLD)
    }

    /// Fields walked relative to the straight-line distance at the time the
    /// current waypoint was set.  `1.0` while undefined or while the agent is
    /// still within the initial distance.
    pub fn progress_ratio(&self) -> f64 {
        let initial = self.initial_distance_to_target;
        let moved = self.fields_moved as f64;
        if initial == 0.0 || moved < initial {
            return 1.0;
        }
        let ratio = moved / initial;
        if ratio.is_finite() { ratio } else { 1.0 }
    }

    // ── Mutators ──────────────────────────────────────────────────────────

    /// Record a new position.  Called by the board on every placement; the
    /// agent never decides its own position.
    pub fn set_position(&mut self, p: GridPoint) {
        self.position = p;
        *self.visits.entry(p).or_insert(0) += 1;
        self.touch();
    }

    /// Change facing.  Callers that hold the agent on a board must go through
    /// `Board::set_direction` so the potential field follows.
    pub fn set_direction(&mut self, direction: Dir4) {
        self.direction = direction;
        self.touch();
    }

    /// Replace the whole route with a planning result.
    ///
    /// An empty `route` marks the agent [`PlanState::Unroutable`].
    pub fn set_route<I: IntoIterator<Item = GridPoint>>(&mut self, route: I) {
        self.route = route.into_iter().collect();
        self.fields_moved = 0;
        self.visits.clear();
        self.plan_state = if self.route.is_empty() {
            PlanState::Unroutable
        } else {
            PlanState::Routed
        };
        self.record_initial_distance();
        self.touch();
    }

    /// Pop the active waypoint and reset the per-waypoint counters.
    ///
    /// If targets remain, the Manhattan distance from the current position to
    /// the new front is stored for progress-ratio analytics.
    pub fn reach_target(&mut self) {
        self.route.pop_front();
        self.fields_moved = 0;
        self.visits.clear();
        self.record_initial_distance();
        self.touch();
    }

    pub fn clear_targets(&mut self) {
        self.route.clear();
        self.fields_moved = 0;
        self.touch();
    }

    /// Hand the agent to the planner: drops the old route and counts the
    /// attempt.
    pub fn mark_pending(&mut self) {
        self.clear_targets();
        self.plan_state = PlanState::Pending;
        self.plan_attempts += 1;
    }

    pub fn increment_fields_moved(&mut self) {
        self.fields_moved += 1;
        self.touch();
    }

    pub fn set_hold_time(&mut self, hold_time: u32) {
        self.hold_time = hold_time;
        self.touch();
    }

    /// Saturates at zero.
    pub fn decrement_hold_time(&mut self) {
        self.hold_time = self.hold_time.saturating_sub(1);
        self.touch();
    }

    pub fn mark_dead(&mut self) {
        self.is_dead = true;
        self.touch();
    }

    fn record_initial_distance(&mut self) {
        self.initial_distance_to_target = match self.route.front() {
            Some(&t) => self.position.manhattan(t) as f64,
            None     => 0.0,
        };
    }

    #[inline]
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
