//! Destination choice, grid A*, and route simplification.
//!
//! # Cost model
//!
//! Every step costs [`SCORE_FACTOR`].  The heuristic at `p` is
//!
//! ```text
//! h(p) = feature(p).modify(SCORE_FACTOR * heuristic_factor * |p - target|)
//! ```
//!
//! so attractors (pull < 127) make their cells look closer and draw routes
//! past them.  Under the Moore neighbourhood a diagonal step is only taken
//! when one of the two cells it cuts across is passable.  With `heuristic_factor = 1`, no features and a 4-connected
//! neighbourhood the heuristic is consistent and A* returns shortest paths.
//!
//! # Simplification
//!
//! The raw cell path is cut into chunks of at most [`MAX_SEGMENT_SIZE`]
//! steps.  Within a chunk, a span whose endpoints see each other collapses
//! to those two points; otherwise it is bisected.  Spans shorter than
//! [`PATH_SMOOTHING`] steps are kept cell by cell.  Chunk boundaries appear
//! once, and the starting cell is dropped from the final route.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ms_core::{AgentRng, GridPoint, Offset};
use ms_grid::Terrain;

use crate::{PlanRequest, PlanResult, PlannerConfig, TargetMode};

/// Cost of one step, and scale of the heuristic.
pub const SCORE_FACTOR: i32 = 100;

/// Longest run of raw path steps simplified as one chunk.
pub const MAX_SEGMENT_SIZE: usize = 7;

/// Spans shorter than this many steps are never collapsed.
pub const PATH_SMOOTHING: usize = 3;

const NO_PREV: usize = usize::MAX;

// ── TacticalPlanner ───────────────────────────────────────────────────────────

/// Stateless route planner.  Shared between worker threads via `Arc`.
pub struct TacticalPlanner {
    config: PlannerConfig,
}

impl TacticalPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Answer one request.  The RNG is derived from the request alone, so
    /// the answer does not depend on the thread that computes it.
    pub fn serve(&self, terrain: &Terrain, request: &PlanRequest) -> PlanResult {
        let mut rng = AgentRng::for_attempt(request.seed, request.agent, request.attempt);
        PlanResult {
            agent:   request.agent,
            route:   self.plan(terrain, request.origin, &mut rng),
            attempt: request.attempt,
        }
    }

    /// Choose destinations for an agent at `origin` and route through them.
    ///
    /// Returns the concatenated simplified legs.  Legs that cannot be
    /// reached are skipped; an empty result means nothing was reachable.
    pub fn plan(&self, terrain: &Terrain, origin: GridPoint, rng: &mut AgentRng) -> Vec<GridPoint> {
        let mut route = Vec::new();
        let mut from = origin;
        for target in self.select_targets(terrain, origin, rng) {
            let leg = self.compute_route(terrain, from, target);
            if leg.is_empty() {
                continue;
            }
            route.extend(leg);
            from = target;
        }
        route
    }

    // ── Destinations ──────────────────────────────────────────────────────

    /// I/O points and attractors at least `min_target_distance` from
    /// `origin`, in row-major order per list.
    pub fn candidate_targets(&self, terrain: &Terrain, origin: GridPoint) -> Vec<GridPoint> {
        let min = self.config.min_target_distance;
        terrain
            .io_points()
            .iter()
            .chain(terrain.attractor_points())
            .copied()
            .filter(|p| p.distance(origin) >= min)
            .collect()
    }

    pub fn select_targets(&self, terrain: &Terrain, origin: GridPoint, rng: &mut AgentRng) -> Vec<GridPoint> {
        match self.config.target_mode {
            TargetMode::Single => {
                let candidates = self.candidate_targets(terrain, origin);
                rng.choose(&candidates).copied().into_iter().collect()
            }
            TargetMode::Tour { min, max } => {
                let passable: Vec<GridPoint> =
                    terrain.points().filter(|&p| terrain.is_passable(p)).collect();
                if passable.is_empty() {
                    return Vec::new();
                }
                let count = rng.gen_range(min..=max.max(min));
                let picks = (0..count).filter_map(|_| rng.choose(&passable).copied()).collect();
                nearest_neighbour_chain(origin, picks)
            }
        }
    }

    // ── Search ────────────────────────────────────────────────────────────

    /// Simplified route from `start` to `target`, without `start` itself.
    /// Empty when `target` is unreachable or equal to `start`.
    pub fn compute_route(&self, terrain: &Terrain, start: GridPoint, target: GridPoint) -> Vec<GridPoint> {
        let path = self.find_path(terrain, start, target);
        if path.len() < 2 {
            return Vec::new();
        }
        let mut route = simplify(terrain, &path);
        route.remove(0);
        route
    }

    /// Raw A* cell path from `start` to `target`, both included.
    ///
    /// Empty when either end is off the board, the target is a wall, or the
    /// open set runs dry.
    pub fn find_path(&self, terrain: &Terrain, start: GridPoint, target: GridPoint) -> Vec<GridPoint> {
        let (Some(s), Some(t)) = (terrain.index_of(start), terrain.index_of(target)) else {
            return Vec::new();
        };
        if !terrain.tile_at(t).is_passable() {
            return Vec::new();
        }
        if s == t {
            return vec![start];
        }

        let n = terrain.len();
        let mut g      = vec![i32::MAX; n];
        let mut prev   = vec![NO_PREV; n];
        let mut closed = vec![false; n];

        // Min-heap on f = g + h; the index breaks ties deterministically.
        let mut open: BinaryHeap<Reverse<(i32, usize)>> = BinaryHeap::new();
        g[s] = 0;
        open.push(Reverse((self.heuristic(terrain, start, target), s)));

        while let Some(Reverse((_, i))) = open.pop() {
            // Stale entry for an already-expanded cell.
            if closed[i] {
                continue;
            }
            closed[i] = true;
            if i == t {
                return reconstruct(terrain, &prev, t);
            }

            let here = terrain.point_of(i);
            let score = g[i].saturating_add(SCORE_FACTOR);
            for &offset in self.config.neighborhood.offsets() {
                let next = here + offset;
                let Some(j) = terrain.index_of(next) else { continue };
                if closed[j] || !terrain.tile_at(j).is_passable() {
                    continue;
                }
                if !corner_walkable(terrain, here, offset) {
                    continue;
                }
                if score < g[j] {
                    g[j] = score;
                    prev[j] = i;
                    let f = score.saturating_add(self.heuristic(terrain, next, target));
                    open.push(Reverse((f, j)));
                }
            }
        }

        Vec::new()
    }

    pub(crate) fn heuristic(&self, terrain: &Terrain, p: GridPoint, target: GridPoint) -> i32 {
        let scale = f64::from(SCORE_FACTOR) * f64::from(self.config.heuristic_factor);
        // Float-to-int `as` saturates.
        let score = (scale * p.distance(target)) as i32;
        match terrain.tile(p) {
            Some(tile) => tile.modify_heuristic_estimate(score),
            None => score,
        }
    }
}

/// A diagonal step needs at least one of the two axis cells it cuts across
/// to be passable, so agents stepping along one axis at a time can follow it.
fn corner_walkable(terrain: &Terrain, here: GridPoint, offset: Offset) -> bool {
    if offset.dx == 0 || offset.dy == 0 {
        return true;
    }
    terrain.is_passable(GridPoint::new(here.x + offset.dx, here.y))
        || terrain.is_passable(GridPoint::new(here.x, here.y + offset.dy))
}

fn reconstruct(terrain: &Terrain, prev: &[usize], target: usize) -> Vec<GridPoint> {
    let mut path = Vec::new();
    let mut cur = target;
    loop {
        path.push(terrain.point_of(cur));
        cur = prev[cur];
        if cur == NO_PREV {
            break;
        }
    }
    path.reverse();
    path
}

// ── Target ordering ───────────────────────────────────────────────────────────

/// Greedy tour: starting at `origin`, repeatedly visit the closest
/// remaining point (squared distance, first wins ties).
pub fn nearest_neighbour_chain(origin: GridPoint, mut points: Vec<GridPoint>) -> Vec<GridPoint> {
    let mut ordered = Vec::with_capacity(points.len());
    let mut from = origin;
    while !points.is_empty() {
        let mut best = 0;
        for (i, p) in points.iter().enumerate().skip(1) {
            if p.distance_sq(from) < points[best].distance_sq(from) {
                best = i;
            }
        }
        from = points.remove(best);
        ordered.push(from);
    }
    ordered
}

// ── Simplification ────────────────────────────────────────────────────────────

/// Reduce a cell path to waypoints with mutual line of sight.
///
/// The first and last points are always kept and no waypoint repeats its
/// predecessor.
pub fn simplify(terrain: &Terrain, path: &[GridPoint]) -> Vec<GridPoint> {
    if path.len() < 2 {
        return path.to_vec();
    }
    let last = path.len() - 1;
    let mut out: Vec<GridPoint> = Vec::new();
    for start in (0..last).step_by(MAX_SEGMENT_SIZE) {
        let end = (start + MAX_SEGMENT_SIZE).min(last);
        let chunk = bisect(terrain, path, start, end);
        let skip = usize::from(!out.is_empty());
        out.extend(chunk.into_iter().skip(skip));
    }
    out
}

fn bisect(terrain: &Terrain, path: &[GridPoint], start: usize, end: usize) -> Vec<GridPoint> {
    if end - start < PATH_SMOOTHING {
        return path[start..=end].to_vec();
    }
    if line_clear(terrain, path[start], path[end]) {
        return vec![path[start], path[end]];
    }
    let middle = (start + end) / 2;
    let mut left = bisect(terrain, path, start, middle);
    left.extend(bisect(terrain, path, middle, end).into_iter().skip(1));
    left
}

/// Sample one point per column or row (whichever axis is longer) along the
/// segment `a → b`; `false` if any sample is off the board or a wall.
pub fn line_clear(terrain: &Terrain, a: GridPoint, b: GridPoint) -> bool {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let steps = (b.x - a.x).abs().max((b.y - a.y).abs());
    if steps == 0 {
        return terrain.is_passable(a);
    }
    (0..=steps).all(|i| {
        let t = f64::from(i) / f64::from(steps);
        let p = GridPoint::new(
            (f64::from(a.x) + dx * t).round() as i32,
            (f64::from(a.y) + dy * t).round() as i32,
        );
        terrain.is_passable(p)
    })
}
