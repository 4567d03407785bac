//! Mutable per-run grid state: occupancy, potential field, lanes.
//!
//! # Ownership
//!
//! The board owns every agent that stands on it (`Option<Box<Agent>>` per
//! cell).  Agents move only through [`Board::set_agent`] and the helpers
//! built on it, which keeps three things in lock-step:
//!
//! * the occupancy relation (at most one agent per cell, none on walls),
//! * the agent's own `position` and visit histogram,
//! * the live potential field, which is the sum of every occupant's force
//!   template rotated to its facing.
//!
//! # Potential field
//!
//! Templates are strictly negative, so the live field is never positive.
//! A positive value means the bookkeeping went wrong and is reported as
//! [`GridError::PositivePotential`] instead of being clamped.  Renderers
//! read `potential_render`, a copy refreshed once per tick by
//! [`Board::publish_potential`].

use std::sync::Arc;

use ms_agent::{Agent, force_at, rotated_template};
use ms_core::{AgentId, Dir4, GridPoint};

use crate::{GridError, GridResult, LaneDirection, Terrain, Tile};

/// Largest |dx| or |dy| of any force template offset, in any facing.
const FOOTPRINT_RADIUS: i32 = 3;

// ── Cell ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Cell {
    occupant:         Option<Box<Agent>>,
    potential:        i32,
    potential_render: i32,
    visit_count:      u32,
    lane:             LaneDirection,
}

impl Cell {
    #[inline]
    pub fn occupant(&self) -> Option<&Agent> {
        self.occupant.as_deref()
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Live potential.
    #[inline]
    pub fn potential(&self) -> i32 {
        self.potential
    }

    /// Potential as of the last [`Board::publish_potential`].
    #[inline]
    pub fn potential_render(&self) -> i32 {
        self.potential_render
    }

    /// Number of agent placements on this cell since the run started.
    #[inline]
    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    #[inline]
    pub fn lane(&self) -> LaneDirection {
        self.lane
    }
}

// ── Board ─────────────────────────────────────────────────────────────────────

pub struct Board {
    terrain:     Arc<Terrain>,
    cells:       Vec<Cell>,
    agent_count: usize,
}

impl Board {
    pub fn new(terrain: Arc<Terrain>) -> Self {
        let mut cells = Vec::with_capacity(terrain.len());
        cells.resize_with(terrain.len(), Cell::default);
        Self { terrain, cells, agent_count: 0 }
    }

    // ── Terrain delegation ────────────────────────────────────────────────

    /// Shared handle to the immutable layout, suitable for planner workers.
    #[inline]
    pub fn terrain(&self) -> &Arc<Terrain> {
        &self.terrain
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.terrain.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.terrain.height()
    }

    #[inline]
    pub fn is_on_board(&self, p: GridPoint) -> bool {
        self.terrain.is_on_board(p)
    }

    #[inline]
    pub fn accessible_field_count(&self) -> usize {
        self.terrain.accessible_field_count()
    }

    #[inline]
    pub fn io_points(&self) -> &[GridPoint] {
        self.terrain.io_points()
    }

    pub fn tile(&self, p: GridPoint) -> Option<&Tile> {
        self.terrain.tile(p)
    }

    // ── Cell access ───────────────────────────────────────────────────────

    pub fn cell(&self, p: GridPoint) -> Option<&Cell> {
        self.terrain.index_of(p).map(|i| &self.cells[i])
    }

    /// Cells of row `y`, left to right.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[Cell] {
        let w = self.width();
        &self.cells[y * w..(y + 1) * w]
    }

    pub fn agent(&self, p: GridPoint) -> Option<&Agent> {
        self.cell(p).and_then(Cell::occupant)
    }

    /// Mutable access to an occupant's route and timers.
    ///
    /// Facing must be changed through [`set_direction`](Self::set_direction)
    /// so the potential field follows; position only through `set_agent`.
    pub fn agent_mut(&mut self, p: GridPoint) -> Option<&mut Agent> {
        let i = self.terrain.index_of(p)?;
        self.cells[i].occupant.as_deref_mut()
    }

    #[inline]
    pub fn is_occupied(&self, p: GridPoint) -> bool {
        self.agent(p).is_some()
    }

    /// `true` when an agent could step onto `p` right now.
    #[inline]
    pub fn is_free(&self, p: GridPoint) -> bool {
        self.terrain.is_passable(p) && !self.is_occupied(p)
    }

    #[inline]
    pub fn count_agents(&self) -> usize {
        self.agent_count
    }

    /// Positions of all occupied cells in row-major order.
    pub fn occupied_points(&self) -> Vec<GridPoint> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_occupied())
            .map(|(i, _)| self.terrain.point_of(i))
            .collect()
    }

    /// All agents in row-major order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.cells.iter().filter_map(Cell::occupant)
    }

    /// Linear scan for the cell holding `id`.
    pub fn find_agent(&self, id: AgentId) -> Option<GridPoint> {
        self.cells
            .iter()
            .position(|c| c.occupant().is_some_and(|a| a.id() == id))
            .map(|i| self.terrain.point_of(i))
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Replace the occupant of `p`, returning the previous one.
    ///
    /// The outgoing agent's force template is subtracted from the field and
    /// the incoming one's is added.  A non-empty assignment records the
    /// position on the agent and bumps the cell's visit counter.
    ///
    /// # Errors
    ///
    /// * [`MsError::OffBoard`](ms_core::MsError::OffBoard) if `p` is outside
    ///   the grid.
    /// * [`GridError::BlockedCell`] when placing onto a wall.  The board is
    ///   unchanged.
    /// * [`GridError::PositivePotential`] if the field ends up positive
    ///   anywhere in the touched neighbourhood.  The board should be treated
    ///   as corrupt.
    pub fn set_agent(&mut self, p: GridPoint, incoming: Option<Agent>) -> GridResult<Option<Agent>> {
        let idx = self.terrain.checked_index(p)?;
        if incoming.is_some() && !self.terrain.tile_at(idx).is_passable() {
            return Err(GridError::BlockedCell(p));
        }

        let outgoing = self.cells[idx].occupant.take();
        if let Some(old) = &outgoing {
            self.agent_count -= 1;
            self.apply_force(p, old.direction(), -1);
        }

        if let Some(mut agent) = incoming {
            agent.set_position(p);
            let facing = agent.direction();
            let cell = &mut self.cells[idx];
            cell.occupant = Some(Box::new(agent));
            cell.visit_count += 1;
            self.agent_count += 1;
            self.apply_force(p, facing, 1);
        }

        self.check_potential(p)?;
        Ok(outgoing.map(|boxed| *boxed))
    }

    /// Put `agent` on an empty cell.
    pub fn place_agent(&mut self, p: GridPoint, agent: Agent) -> GridResult<()> {
        if self.is_occupied(p) {
            return Err(GridError::Occupied(p));
        }
        self.set_agent(p, Some(agent)).map(|_| ())
    }

    /// Remove and return the occupant of `p`.
    pub fn take_agent(&mut self, p: GridPoint) -> GridResult<Agent> {
        self.set_agent(p, None)?.ok_or(GridError::Vacant(p))
    }

    /// Move the occupant of `from` onto the empty cell `to`.
    pub fn move_agent(&mut self, from: GridPoint, to: GridPoint) -> GridResult<()> {
        if !self.is_occupied(from) {
            return Err(GridError::Vacant(from));
        }
        if self.is_occupied(to) {
            return Err(GridError::Occupied(to));
        }
        if !self.terrain.is_passable(to) {
            self.terrain.checked_index(to)?;
            return Err(GridError::BlockedCell(to));
        }
        let agent = self.take_agent(from)?;
        self.set_agent(to, Some(agent)).map(|_| ())
    }

    /// Exchange the occupants of two occupied cells.
    pub fn swap_agents(&mut self, a: GridPoint, b: GridPoint) -> GridResult<()> {
        if !self.is_occupied(a) {
            return Err(GridError::Vacant(a));
        }
        if !self.is_occupied(b) {
            return Err(GridError::Vacant(b));
        }
        let first  = self.take_agent(a)?;
        let second = self.take_agent(b)?;
        self.set_agent(a, Some(second))?;
        self.set_agent(b, Some(first)).map(|_| ())
    }

    /// Turn the occupant of `p`, re-rotating its force template.
    pub fn set_direction(&mut self, p: GridPoint, dir: Dir4) -> GridResult<()> {
        let idx = self.terrain.checked_index(p)?;
        let old = match self.cells[idx].occupant.as_deref() {
            Some(agent) => agent.direction(),
            None => return Err(GridError::Vacant(p)),
        };
        if old == dir {
            return Ok(());
        }
        self.apply_force(p, old, -1);
        if let Some(agent) = self.cells[idx].occupant.as_deref_mut() {
            agent.set_direction(dir);
        }
        self.apply_force(p, dir, 1);
        self.check_potential(p)
    }

    // ── Potential field ───────────────────────────────────────────────────

    pub fn potential(&self, p: GridPoint) -> Option<i32> {
        self.cell(p).map(Cell::potential)
    }

    pub fn potential_render(&self, p: GridPoint) -> Option<i32> {
        self.cell(p).map(Cell::potential_render)
    }

    /// Live potential at `p` minus the contribution of the agent standing at
    /// `own` (if any), i.e. the pressure everyone else exerts there.
    pub fn potential_excluding(&self, p: GridPoint, own: GridPoint) -> Option<i32> {
        let live = self.potential(p)?;
        let own_force = self
            .agent(own)
            .map(|a| force_at(a.direction(), p - own))
            .unwrap_or(0);
        Some(live - own_force)
    }

    /// Copy the live field into the render snapshot.
    pub fn publish_potential(&mut self) {
        for cell in &mut self.cells {
            cell.potential_render = cell.potential;
        }
    }

    /// Add (`sign = 1`) or remove (`sign = -1`) one facing's template
    /// centred on `p`.  Walls and off-board offsets are skipped.
    fn apply_force(&mut self, p: GridPoint, facing: Dir4, sign: i32) {
        for (offset, force) in rotated_template(facing) {
            let q = p + offset;
            let Some(i) = self.terrain.index_of(q) else { continue };
            if !self.terrain.tile_at(i).is_passable() {
                continue;
            }
            self.cells[i].potential += sign * force;
        }
    }

    /// Scan every cell a rotated template centred on `p` can reach.
    fn check_potential(&self, p: GridPoint) -> GridResult<()> {
        for dy in -FOOTPRINT_RADIUS..=FOOTPRINT_RADIUS {
            for dx in -FOOTPRINT_RADIUS..=FOOTPRINT_RADIUS {
                let q = GridPoint::new(p.x + dx, p.y + dy);
                if let Some(value) = self.potential(q).filter(|&v| v > 0) {
                    return Err(GridError::PositivePotential { at: q, value });
                }
            }
        }
        Ok(())
    }

    // ── Lanes ─────────────────────────────────────────────────────────────

    pub fn lane(&self, p: GridPoint) -> Option<LaneDirection> {
        self.cell(p).map(Cell::lane)
    }

    /// Overwrite the lane classification of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height` or `lanes.len() != width`.
    pub fn set_row_lanes(&mut self, y: usize, lanes: &[LaneDirection]) {
        let w = self.width();
        assert_eq!(lanes.len(), w, "lane row length must match board width");
        for (cell, &lane) in self.cells[y * w..(y + 1) * w].iter_mut().zip(lanes) {
            cell.lane = lane;
        }
    }
}
