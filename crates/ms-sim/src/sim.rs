//! The `Sim` struct and its tick loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

use ms_agent::{Agent, MovementProfile, PlanState, V_MAX};
use ms_analysis::{LaneAnalyzer, flow_stats};
use ms_core::{AgentId, Dir4, GridPoint, SimRng, Tick};
use ms_grid::{Board, FeatureAction, GridError, GridResult, TileKind};
use ms_movement::{SpeedBudgets, StepOutcome, algorithm_for};
use ms_tactical::{PlanRequest, PlanResult, TacticalPool};

use crate::stats::RunTotals;
use crate::{Phase, RunSummary, SimConfig, SimError, SimObserver, SimResult, TickStats};

/// Cells per seeded agent when `initial_agents` is not set.
pub const SEED_CELLS_PER_AGENT: usize = 250;

#[cfg(feature = "fx-hash")]
type IdSet = rustc_hash::FxHashSet<AgentId>;
#[cfg(not(feature = "fx-hash"))]
type IdSet = std::collections::HashSet<AgentId>;

// ── RunState / StopHandle ─────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// Built, nothing placed or planned yet.
    #[default]
    Idle,
    /// Scattering the initial population and queueing its routes.
    Seeding,
    Stepping,
    /// The worker pool is stopped; the board stays readable.
    Finished,
}

/// Cancels a run between ticks.  Clone it into whatever thread or observer
/// should be able to stop the run.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation runner.
///
/// `Sim` owns the board and the tactical worker pool and drives one tick as
///
/// 1. **Collect**: apply routes the planner has finished (with
///    `synchronous_routing`, wait for all of them).
/// 2. **Generate**: add `arrival_rate` to a fractional accumulator and spawn
///    one agent on a random free I/O point per whole unit, while the crowd
///    cap allows.  Every new agent is queued for planning, blocking while
///    the queue is full.
/// 3. **Arrival check**: agents on their waypoint pop it; agents within
///    `arrival_radius` pop it with probability `1 / distance²`.
/// 4. **Prepare**: each agent with a pending waypoint lets its tile's
///    movement algorithm pick a facing.
/// 5. **Move**: `V_MAX` row-major sub-steps under per-agent speed budgets.
/// 6. **Retire**: agents without waypoints leave; unroutable ones are
///    re-queued until `max_plan_attempts` is used up.
/// 7. **Analyze**: lane classification and flow statistics.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    config:        SimConfig,
    board:         Board,
    pool:          TacticalPool,
    analyzer:      LaneAnalyzer,
    budgets:       SpeedBudgets,
    rng:           SimRng,
    stop:          StopHandle,
    state:         RunState,
    tick:          Tick,
    next_id:       u64,
    arrival_level: f64,
    totals:        RunTotals,
    cancelled:     bool,
}

impl Sim {
    pub(crate) fn new(config: SimConfig, board: Board, pool: TacticalPool, stop: StopHandle) -> Self {
        let next_id = board.agents().map(|a| a.id().0 + 1).max().unwrap_or(1);
        Self {
            analyzer:      LaneAnalyzer::new(config.assessment_frame_width),
            budgets:       SpeedBudgets::new(),
            rng:           SimRng::new(config.seed),
            state:         RunState::Idle,
            tick:          Tick::ZERO,
            arrival_level: 0.0,
            totals:        RunTotals::default(),
            cancelled:     false,
            next_id,
            config,
            board,
            pool,
            stop,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The next tick to be simulated.
    #[inline]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Totals so far.
    pub fn summary(&self) -> RunSummary {
        self.totals.summary(self.board.count_agents(), self.cancelled)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Seed if needed, then step until `config.total_ticks` or until the
    /// stop handle fires, and finish the run.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        self.ensure_seeded()?;
        while self.tick.0 < self.config.total_ticks {
            if self.stop.is_stopped() {
                info!(tick = %self.tick, "run stopped");
                self.cancelled = true;
                break;
            }
            self.step(observer)?;
            if self.config.tick_delay_ms > 0 {
                thread::sleep(Duration::from_millis(self.config.tick_delay_ms));
            }
        }
        self.finish(observer)
    }

    /// Simulate exactly one tick, ignoring `total_ticks` and the stop
    /// handle.  Seeds first if the run has not started.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickStats> {
        self.ensure_seeded()?;
        let now = self.tick;

        observer.on_tick_start(now);
        let stats = self.process_tick(now, observer)?;
        observer.on_tick_end(now, &stats);
        if now.is_every(self.config.frame_interval_ticks) {
            observer.on_frame(now, &self.board);
        }

        self.tick = now + 1;
        Ok(stats)
    }

    /// Stop the worker pool and report.  Further steps fail with
    /// [`SimError::Finished`].
    pub fn finish<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        self.ensure_seeded()?;
        self.pool.shutdown();
        self.state = RunState::Finished;

        let summary = self.summary();
        info!(
            ticks        = summary.ticks,
            successes    = summary.successes,
            total_agents = summary.total_agents,
            absorbed     = summary.absorbed,
            unroutable   = summary.unroutable,
            cancelled    = summary.cancelled,
            "run finished"
        );
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    // ── Seeding ───────────────────────────────────────────────────────────

    fn ensure_seeded(&mut self) -> SimResult<()> {
        match self.state {
            RunState::Idle => self.seed_population(),
            RunState::Seeding | RunState::Stepping => Ok(()),
            RunState::Finished => Err(SimError::Finished),
        }
    }

    /// Scatter the initial population over free cells and queue a route for
    /// every agent on the board that has none, hand-placed ones included.
    fn seed_population(&mut self) -> SimResult<()> {
        self.state = RunState::Seeding;

        let wanted = self
            .config
            .initial_agents
            .unwrap_or(self.board.width() * self.board.height() / SEED_CELLS_PER_AGENT);
        let mut free: Vec<GridPoint> = self
            .board
            .terrain()
            .points()
            .filter(|&p| self.board.is_free(p))
            .collect();
        self.rng.shuffle(&mut free);

        for p in free.into_iter().take(wanted) {
            let profile = MovementProfile::ALL[self.rng.gen_range(0..MovementProfile::ALL.len())];
            let facing = Dir4::ALL[self.rng.gen_range(0..Dir4::ALL.len())];
            let mut agent = Agent::new(self.allocate_id(), profile);
            agent.set_direction(facing);
            self.board.place_agent(p, agent).map_err(|e| invariant(Tick::ZERO, e))?;
        }

        let mut submitted = 0usize;
        for p in self.board.occupied_points() {
            let needs_route = self
                .board
                .agent(p)
                .is_some_and(|a| a.plan_state() == PlanState::Idle && a.target().is_none());
            if needs_route {
                self.submit(p)?;
                submitted += 1;
            }
        }

        self.totals.total_agents += self.board.count_agents();
        self.state = RunState::Stepping;
        info!(agents = self.board.count_agents(), submitted, "population seeded");
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<TickStats> {
        let mut stats = TickStats { tick: now, ..TickStats::default() };

        // ── Phase 1: collect planning results ─────────────────────────────
        self.collect_routes()?;

        // ── Phase 2: generate ─────────────────────────────────────────────
        stats.spawned = self.generate_agents(now)?;

        // ── Phase 3: arrival check ────────────────────────────────────────
        stats.successes = self.check_arrivals();

        // ── Phase 4: prepare ──────────────────────────────────────────────
        self.prepare_agents().map_err(|e| invariant(now, e))?;
        self.board.publish_potential();
        observer.on_phase(now, Phase::Prepare, &self.board);

        // ── Phase 5: move ─────────────────────────────────────────────────
        self.move_agents(&mut stats).map_err(|e| invariant(now, e))?;
        self.board.publish_potential();
        observer.on_phase(now, Phase::Move, &self.board);

        // ── Phase 6: retire ───────────────────────────────────────────────
        self.retire_agents(now, &mut stats)?;

        // ── Phase 7: analyze ──────────────────────────────────────────────
        let lanes = self.analyzer.assess(&mut self.board);
        let flow = flow_stats(&self.board);
        stats.agents           = self.board.count_agents();
        stats.lane_percentage  = lanes.lane_percentage;
        stats.coherence        = lanes.coherence;
        stats.lost             = flow.lost;
        stats.average_progress = flow.average_progress;
        self.totals.record(&stats);

        debug!(
            tick      = now.0,
            agents    = stats.agents,
            spawned   = stats.spawned,
            retired   = stats.retired,
            successes = stats.successes,
            "tick complete"
        );
        Ok(stats)
    }

    /// Apply every finished route.  Results whose agent has left or has
    /// been re-queued since are dropped.
    fn collect_routes(&mut self) -> SimResult<()> {
        let mut results = self.pool.drain();
        if self.config.synchronous_routing {
            while self.pool.outstanding() > 0 {
                results.push(self.pool.recv()?);
            }
        }
        for result in results {
            self.apply_route(result);
        }
        Ok(())
    }

    fn apply_route(&mut self, result: PlanResult) {
        let Some(at) = self.board.find_agent(result.agent) else {
            debug!(agent = %result.agent, "route for a departed agent dropped");
            return;
        };
        let Some(agent) = self.board.agent_mut(at) else { return };
        if agent.plan_state() != PlanState::Pending || agent.plan_attempts() != result.attempt {
            debug!(agent = %result.agent, attempt = result.attempt, "stale route dropped");
            return;
        }
        if result.route.is_empty() {
            debug!(agent = %result.agent, attempt = result.attempt, "no reachable destination");
        }
        agent.set_route(result.route);
    }

    fn generate_agents(&mut self, now: Tick) -> SimResult<usize> {
        self.arrival_level += self.config.arrival_rate;
        let accessible = self.board.accessible_field_count();
        let mut entries = self.board.io_points().to_vec();
        let mut spawned = 0;

        while self.arrival_level >= 1.0 {
            if accessible == 0 {
                break;
            }
            let crowd = (self.board.count_agents() + 1) as f64 / accessible as f64;
            if crowd > self.config.max_crowd_factor {
                break;
            }

            self.rng.shuffle(&mut entries);
            let entry = entries.iter().copied().find(|&p| self.board.is_free(p));
            if let Some(p) = entry {
                let agent = Agent::new(self.allocate_id(), MovementProfile::Average);
                self.board.place_agent(p, agent).map_err(|e| invariant(now, e))?;
                self.submit(p)?;
                spawned += 1;
            }
            self.arrival_level -= 1.0;
        }
        Ok(spawned)
    }

    /// Returns how many agents popped their final waypoint.
    fn check_arrivals(&mut self) -> usize {
        let radius = self.config.arrival_radius;
        let mut completed = 0;
        for p in self.board.occupied_points() {
            let Some(target) = self.board.agent(p).and_then(|a| a.target()) else { continue };
            let reached = target == p || {
                let d = p.distance(target);
                d < radius && self.rng.next_f64() < 1.0 / (d * d)
            };
            if !reached {
                continue;
            }
            if let Some(agent) = self.board.agent_mut(p) {
                agent.reach_target();
                if agent.target().is_none() {
                    completed += 1;
                }
            }
        }
        completed
    }

    fn prepare_agents(&mut self) -> GridResult<()> {
        for p in self.board.occupied_points() {
            let pending = self
                .board
                .agent(p)
                .and_then(|a| a.target())
                .is_some_and(|t| t != p);
            if pending {
                algorithm_for(self.tile_kind(p)).prepare(&mut self.board, p)?;
            }
        }
        Ok(())
    }

    fn move_agents(&mut self, stats: &mut TickStats) -> GridResult<()> {
        self.budgets.refill(&self.board);
        let mut moved = IdSet::default();
        let width = self.board.width() as i32;
        let height = self.board.height() as i32;

        for _ in 0..V_MAX {
            moved.clear();
            for y in 0..height {
                for x in 0..width {
                    let p = GridPoint::new(x, y);
                    let Some(agent) = self.board.agent_mut(p) else { continue };
                    let id = agent.id();
                    if moved.contains(&id) {
                        continue;
                    }
                    if agent.hold_time() > 0 {
                        agent.decrement_hold_time();
                        continue;
                    }
                    if agent.target().is_none_or(|t| t == p) {
                        continue;
                    }
                    moved.insert(id);
                    if self.budgets.remaining(id) == 0 {
                        continue;
                    }

                    let outcome = algorithm_for(self.tile_kind(p)).next_iteration_step(
                        &mut self.board,
                        p,
                        &mut self.budgets,
                        &mut self.rng,
                    )?;
                    self.budgets.consume(id);

                    match outcome {
                        StepOutcome::Moved(to) => self.enter_cell(to, stats)?,
                        StepOutcome::Swapped(to) => {
                            self.enter_cell(to, stats)?;
                            self.enter_cell(p, stats)?;
                        }
                        StepOutcome::Idle | StepOutcome::Blocked => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Run the feature of `at` on the agent that just stepped onto it.
    fn enter_cell(&mut self, at: GridPoint, stats: &mut TickStats) -> GridResult<()> {
        let Some(feature) = self.board.terrain().feature(at).cloned() else { return Ok(()) };
        let Some(agent) = self.board.agent_mut(at) else { return Ok(()) };
        if !matches!(feature.perform_action(agent), FeatureAction::Absorb) {
            return Ok(());
        }

        let agent = self.board.take_agent(at)?;
        self.budgets.remove(agent.id());
        stats.absorbed += 1;
        if agent.target() == Some(at) && agent.target_count() == 1 {
            stats.successes += 1;
        }
        debug!(agent = %agent.id(), x = at.x, y = at.y, "agent left through an exit");
        Ok(())
    }

    fn retire_agents(&mut self, now: Tick, stats: &mut TickStats) -> SimResult<()> {
        for p in self.board.occupied_points() {
            let Some(agent) = self.board.agent(p) else { continue };
            let id = agent.id();
            let state = agent.plan_state();
            let attempts = agent.plan_attempts();
            let dead = agent.is_dead();
            let finished = dead || (agent.target().is_none() && state != PlanState::Pending);
            if !finished {
                continue;
            }

            if state == PlanState::Unroutable && !dead {
                if attempts <= self.config.max_plan_attempts {
                    self.submit(p)?;
                    continue;
                }
                stats.unroutable += 1;
                debug!(agent = %id, attempts, "agent retired without a route");
            }

            self.board.take_agent(p).map_err(|e| invariant(now, e))?;
            self.budgets.remove(id);
            stats.retired += 1;
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Mark the agent at `at` pending and queue a planning request for it.
    fn submit(&mut self, at: GridPoint) -> SimResult<()> {
        let Some(agent) = self.board.agent_mut(at) else { return Ok(()) };
        agent.mark_pending();
        let request = PlanRequest {
            agent:   agent.id(),
            origin:  at,
            attempt: agent.plan_attempts(),
            seed:    self.config.seed,
        };
        self.pool.submit(request)?;
        Ok(())
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn tile_kind(&self, p: GridPoint) -> TileKind {
        self.board.terrain().kind(p).unwrap_or(TileKind::Wall)
    }
}

/// Log a grid invariant violation and turn it into the run-aborting error.
fn invariant(tick: Tick, source: GridError) -> SimError {
    error!(%tick, error = %source, "grid invariant violated, aborting run");
    SimError::Invariant { tick, source }
}
