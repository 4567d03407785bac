//! Fluent builder for hand-placed agents (seeding, tests, host tools).
//!
//! # Usage
//!
//! ```rust
//! use ms_agent::{AgentBuilder, MovementProfile};
//! use ms_core::{AgentId, Dir4, GridPoint};
//!
//! let agent = AgentBuilder::new(AgentId(1))
//!     .profile(MovementProfile::Dynamic)
//!     .direction(Dir4::E)
//!     .route([GridPoint::new(5, 0), GridPoint::new(9, 3)])
//!     .build();
//!
//! assert_eq!(agent.target(), Some(GridPoint::new(5, 0)));
//! assert_eq!(agent.v_max(), 6);
//! ```
//!
//! The builder does not set a position: agents get one when the board
//! places them.

use ms_core::{AgentId, Dir4, GridPoint};

use crate::{Agent, MovementProfile};

pub struct AgentBuilder {
    id:        AgentId,
    profile:   MovementProfile,
    direction: Dir4,
    route:     Vec<GridPoint>,
    hold_time: u32,
}

impl AgentBuilder {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            profile:   MovementProfile::default(),
            direction: Dir4::N,
            route:     Vec::new(),
            hold_time: 0,
        }
    }

    pub fn profile(mut self, profile: MovementProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn direction(mut self, direction: Dir4) -> Self {
        self.direction = direction;
        self
    }

    /// Pre-assign a route.  The agent is marked routed, as if a planning
    /// result had been applied.
    pub fn route<I: IntoIterator<Item = GridPoint>>(mut self, route: I) -> Self {
        self.route = route.into_iter().collect();
        self
    }

    pub fn hold_time(mut self, hold_time: u32) -> Self {
        self.hold_time = hold_time;
        self
    }

    pub fn build(self) -> Agent {
        let mut agent = Agent::new(self.id, self.profile);
        agent.set_direction(self.direction);
        if !self.route.is_empty() {
            agent.set_route(self.route);
        }
        if self.hold_time > 0 {
            agent.set_hold_time(self.hold_time);
        }
        agent
    }
}
