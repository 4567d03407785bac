//! Unit tests for ms-tactical.

#[cfg(test)]
mod helpers {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use ms_core::GridPoint;
    use ms_grid::{Feature, Terrain, TerrainBuilder};

    pub fn p(x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, y)
    }

    /// 20×20 open floor, spawner at (0,0), attractor (pull 100, hold 3) at
    /// (19,19).
    pub fn mall_20() -> Terrain {
        let mut b = TerrainBuilder::new(20, 20);
        b.set_feature(p(0, 0), Arc::new(Feature::spawner('S'))).unwrap();
        b.set_feature(p(19, 19), Arc::new(Feature::attractor('A', 100, 3))).unwrap();
        b.build()
    }

    pub fn with_walls(width: usize, height: usize, walls: &[GridPoint]) -> Terrain {
        let mut b = TerrainBuilder::new(width, height);
        for &w in walls {
            b.set_wall(w).unwrap();
        }
        b.build()
    }

    /// Reference 4-connected shortest path length in steps.
    pub fn bfs_steps(t: &Terrain, from: GridPoint, to: GridPoint) -> Option<usize> {
        let mut dist = vec![usize::MAX; t.len()];
        let mut queue = VecDeque::new();
        dist[t.index_of(from)?] = 0;
        queue.push_back(from);
        while let Some(cur) = queue.pop_front() {
            let d = dist[t.index_of(cur)?];
            if cur == to {
                return Some(d);
            }
            for next in [p(cur.x, cur.y - 1), p(cur.x - 1, cur.y), p(cur.x + 1, cur.y), p(cur.x, cur.y + 1)] {
                let Some(j) = t.index_of(next) else { continue };
                if t.is_passable(next) && dist[j] == usize::MAX {
                    dist[j] = d + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::helpers::{p, with_walls};
    use crate::{
        Neighborhood, PlannerConfig, PoolConfig, SCORE_FACTOR, TacticalError, TacticalPlanner, TargetMode,
    };

    #[test]
    fn defaults() {
        let c = PlannerConfig::default();
        assert_eq!(c.heuristic_factor, 5);
        assert_eq!(c.neighborhood, Neighborhood::Moore);
        assert_eq!(c.target_mode, TargetMode::Single);
        assert_eq!(c.min_target_distance, 10.0);
        let pool = PoolConfig::default();
        assert_eq!((pool.workers, pool.queue_capacity), (4, 5));
    }

    #[test]
    fn validation() {
        assert!(PlannerConfig::default().validate().is_ok());
        let bad_tour = PlannerConfig { target_mode: TargetMode::Tour { min: 3, max: 2 }, ..Default::default() };
        assert!(bad_tour.validate().is_err());
        let bad_dist = PlannerConfig { min_target_distance: f64::NAN, ..Default::default() };
        assert!(bad_dist.validate().is_err());
        assert!(PoolConfig { workers: 0, queue_capacity: 1 }.validate().is_err());
        assert!(PoolConfig { workers: 1, queue_capacity: 0 }.validate().is_err());
    }

    #[test]
    fn heuristic_factor_must_fit_the_score_range() {
        let largest = i32::MAX / SCORE_FACTOR;
        let edge = PlannerConfig { heuristic_factor: largest, ..Default::default() };
        assert!(edge.validate().is_ok());
        for factor in [largest + 1, 30_000_000, i32::MAX, -1] {
            let bad = PlannerConfig { heuristic_factor: factor, ..Default::default() };
            assert!(matches!(bad.validate(), Err(TacticalError::Config(_))), "factor {factor}");
        }
    }

    #[test]
    fn largest_heuristic_factor_still_finds_paths() {
        let planner = TacticalPlanner::new(PlannerConfig {
            heuristic_factor: i32::MAX / SCORE_FACTOR,
            ..Default::default()
        });
        let t = with_walls(5, 5, &[]);
        assert!(planner.heuristic(&t, p(0, 0), p(4, 4)) > 0);
        let path = planner.find_path(&t, p(0, 0), p(4, 4));
        assert_eq!(path.first(), Some(&p(0, 0)));
        assert_eq!(path.last(), Some(&p(4, 4)));
    }

    #[test]
    fn default_tour_bounds() {
        assert_eq!(TargetMode::DEFAULT_TOUR, TargetMode::Tour { min: 1, max: 14 });
        let c = PlannerConfig { target_mode: TargetMode::DEFAULT_TOUR, ..Default::default() };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn neighbourhood_sizes() {
        assert_eq!(Neighborhood::VonNeumann.offsets().len(), 4);
        assert_eq!(Neighborhood::Moore.offsets().len(), 8);
    }
}

// ── A* ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod astar {
    use std::sync::Arc;

    use ms_grid::{Feature, TerrainBuilder};

    use super::helpers::{mall_20, p, with_walls};
    use crate::{Neighborhood, PlannerConfig, SCORE_FACTOR, TacticalPlanner};

    fn four_connected() -> TacticalPlanner {
        TacticalPlanner::new(PlannerConfig {
            heuristic_factor: 1,
            neighborhood: Neighborhood::VonNeumann,
            ..Default::default()
        })
    }

    #[test]
    fn straight_corridor() {
        let t = with_walls(10, 1, &[]);
        let path = four_connected().find_path(&t, p(0, 0), p(9, 0));
        assert_eq!(path.len(), 10);
        assert_eq!(path.first(), Some(&p(0, 0)));
        assert_eq!(path.last(), Some(&p(9, 0)));
    }

    #[test]
    fn detours_around_wall() {
        // Wall column at x=2 with a gap at y=4.
        let walls: Vec<_> = (0..4).map(|y| p(2, y)).collect();
        let t = with_walls(5, 5, &walls);
        let path = four_connected().find_path(&t, p(0, 0), p(4, 0));
        assert!(path.contains(&p(2, 4)));
        assert_eq!(path.len() - 1, 4 + 4 + 4);
    }

    #[test]
    fn unreachable_is_empty() {
        let t = with_walls(5, 5, &[p(3, 4), p(4, 3), p(3, 3)]);
        assert!(four_connected().find_path(&t, p(0, 0), p(4, 4)).is_empty());
        assert!(four_connected().find_path(&t, p(0, 0), p(3, 3)).is_empty());
        assert!(four_connected().find_path(&t, p(0, 0), p(9, 9)).is_empty());
    }

    #[test]
    fn start_equals_target() {
        let t = with_walls(3, 3, &[]);
        let planner = four_connected();
        assert_eq!(planner.find_path(&t, p(1, 1), p(1, 1)), vec![p(1, 1)]);
        assert!(planner.compute_route(&t, p(1, 1), p(1, 1)).is_empty());
    }

    #[test]
    fn moore_takes_diagonals() {
        let t = with_walls(6, 6, &[]);
        let planner = TacticalPlanner::new(PlannerConfig { heuristic_factor: 1, ..Default::default() });
        assert_eq!(planner.find_path(&t, p(0, 0), p(5, 5)).len(), 6);
    }

    #[test]
    fn moore_never_squeezes_between_diagonal_walls() {
        // Walls at (1,0) and (0,1) close off (0,0) for axis-only stepping.
        let t = with_walls(3, 3, &[p(1, 0), p(0, 1)]);
        let planner = TacticalPlanner::new(PlannerConfig { heuristic_factor: 1, ..Default::default() });
        assert!(planner.find_path(&t, p(0, 0), p(2, 2)).is_empty());
        assert!(planner.find_path(&t, p(2, 2), p(0, 0)).is_empty());
    }

    #[test]
    fn moore_cuts_a_corner_with_one_side_open() {
        let t = with_walls(3, 3, &[p(1, 0)]);
        let planner = TacticalPlanner::new(PlannerConfig { heuristic_factor: 1, ..Default::default() });
        let path = planner.find_path(&t, p(0, 0), p(1, 1));
        assert_eq!(path, vec![p(0, 0), p(1, 1)]);
    }

    #[test]
    fn moore_steps_stay_axis_walkable() {
        // Diagonal wall line from (4,0) to (0,4) with one missing cell; a
        // route through it must always leave an axis step open.
        let walls: Vec<_> = (0..5).filter(|&i| i != 2).map(|i| p(4 - i, i)).collect();
        let t = with_walls(5, 5, &walls);
        let planner = TacticalPlanner::new(PlannerConfig { heuristic_factor: 1, ..Default::default() });
        let path = planner.find_path(&t, p(0, 0), p(4, 4));
        assert!(!path.is_empty());
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.x != b.x && a.y != b.y {
                assert!(t.is_passable(p(b.x, a.y)) || t.is_passable(p(a.x, b.y)), "{a:?} -> {b:?}");
            }
        }
    }

    #[test]
    fn attractor_lowers_heuristic() {
        let planner = TacticalPlanner::new(PlannerConfig::default());
        let t = mall_20();
        let plain = planner.heuristic(&t, p(18, 19), p(19, 19));
        assert_eq!(plain, SCORE_FACTOR * 5);
        // The attractor's own cell, one step from the target.
        assert_eq!(planner.heuristic(&t, p(19, 19), p(19, 18)), SCORE_FACTOR * 5 * 100 / 127);

        let mut b = TerrainBuilder::new(3, 1);
        b.set_feature(p(1, 0), Arc::new(Feature::spawner('S'))).unwrap();
        let t = b.build();
        assert_eq!(planner.heuristic(&t, p(1, 0), p(0, 0)), SCORE_FACTOR * 5);
    }
}

// ── Simplification ────────────────────────────────────────────────────────────

#[cfg(test)]
mod simplify {
    use super::helpers::{p, with_walls};
    use crate::{Neighborhood, PlannerConfig, TacticalPlanner, line_clear, simplify};

    #[test]
    fn line_of_sight() {
        let t = with_walls(6, 6, &[p(2, 2)]);
        assert!(line_clear(&t, p(0, 0), p(5, 0)));
        assert!(!line_clear(&t, p(0, 0), p(4, 4)));
        assert!(line_clear(&t, p(0, 0), p(1, 1)));
        assert!(!line_clear(&t, p(0, 0), p(6, 0)));
        assert!(line_clear(&t, p(3, 3), p(3, 3)));
    }

    #[test]
    fn two_point_route_is_unchanged() {
        let t = with_walls(4, 4, &[]);
        let route = vec![p(0, 0), p(1, 0)];
        assert_eq!(simplify(&t, &route), route);
    }

    #[test]
    fn straight_run_keeps_chunk_boundaries_and_tail() {
        let t = with_walls(20, 1, &[]);
        let path: Vec<_> = (0..20).map(|x| p(x, 0)).collect();
        assert_eq!(simplify(&t, &path), vec![p(0, 0), p(7, 0), p(14, 0), p(19, 0)]);
    }

    #[test]
    fn short_spans_are_kept_cell_by_cell() {
        let t = with_walls(3, 1, &[]);
        let path = vec![p(0, 0), p(1, 0), p(2, 0)];
        assert_eq!(simplify(&t, &path), path);
    }

    #[test]
    fn route_excludes_start() {
        let t = with_walls(10, 10, &[]);
        let planner = TacticalPlanner::new(PlannerConfig {
            neighborhood: Neighborhood::VonNeumann,
            ..Default::default()
        });
        let route = planner.compute_route(&t, p(0, 0), p(9, 0));
        assert_eq!(route.first(), Some(&p(7, 0)));
        assert_eq!(route.last(), Some(&p(9, 0)));
        assert!(!route.contains(&p(0, 0)));
    }
}

// ── Destinations ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod targets {
    use ms_core::{AgentId, AgentRng};

    use super::helpers::{mall_20, p, with_walls};
    use crate::{PlannerConfig, TacticalPlanner, TargetMode, nearest_neighbour_chain};

    #[test]
    fn candidates_respect_min_distance() {
        let planner = TacticalPlanner::new(PlannerConfig::default());
        let t = mall_20();
        assert_eq!(planner.candidate_targets(&t, p(0, 0)), vec![p(19, 19)]);
        assert_eq!(planner.candidate_targets(&t, p(10, 10)), vec![p(0, 0), p(19, 19)]);
        assert!(planner.candidate_targets(&t, p(15, 15)).contains(&p(0, 0)));
        assert!(!planner.candidate_targets(&t, p(15, 15)).contains(&p(19, 19)));
    }

    #[test]
    fn no_candidates_gives_empty_route() {
        let planner = TacticalPlanner::new(PlannerConfig::default());
        let t = with_walls(5, 5, &[]);
        let mut rng = AgentRng::new(1, AgentId(0));
        assert!(planner.plan(&t, p(0, 0), &mut rng).is_empty());
    }

    #[test]
    fn chain_visits_nearest_first() {
        let ordered = nearest_neighbour_chain(p(0, 0), vec![p(9, 9), p(1, 0), p(5, 5), p(2, 1)]);
        assert_eq!(ordered, vec![p(1, 0), p(2, 1), p(5, 5), p(9, 9)]);
    }

    #[test]
    fn tour_mode_routes_through_passable_cells() {
        let t = with_walls(12, 12, &[p(5, 5), p(5, 6), p(6, 5)]);
        let planner = TacticalPlanner::new(PlannerConfig {
            target_mode: TargetMode::Tour { min: 3, max: 6 },
            ..Default::default()
        });
        let mut rng = AgentRng::new(7, AgentId(3));
        let targets = planner.select_targets(&t, p(0, 0), &mut rng);
        assert!((3..=6).contains(&targets.len()));
        assert!(targets.iter().all(|&q| t.is_passable(q)));

        let mut rng = AgentRng::new(7, AgentId(3));
        let route = planner.plan(&t, p(0, 0), &mut rng);
        assert!(route.iter().all(|&q| t.is_passable(q)));
    }

    #[test]
    fn same_seed_same_route() {
        let planner = TacticalPlanner::new(PlannerConfig {
            target_mode: TargetMode::DEFAULT_TOUR,
            ..Default::default()
        });
        let t = mall_20();
        let a = planner.plan(&t, p(3, 3), &mut AgentRng::for_attempt(42, AgentId(5), 1));
        let b = planner.plan(&t, p(3, 3), &mut AgentRng::for_attempt(42, AgentId(5), 1));
        assert_eq!(a, b);
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use ms_agent::{Agent, MovementProfile};
    use ms_core::AgentId;
    use ms_grid::FeatureAction;

    use super::helpers::{mall_20, p};
    use crate::{PlanRequest, PlannerConfig, TacticalPlanner};

    #[test]
    fn spawned_agent_routes_to_attractor_and_is_held() {
        let t = mall_20();
        let planner = TacticalPlanner::new(PlannerConfig::default());
        let request = PlanRequest { agent: AgentId(0), origin: p(0, 0), attempt: 1, seed: 42 };
        let result = planner.serve(&t, &request);

        assert_eq!(result.route.last(), Some(&p(19, 19)));
        assert!(!result.route.contains(&p(0, 0)));

        let mut agent = Agent::new(AgentId(0), MovementProfile::Average);
        let action = t.feature(p(19, 19)).unwrap().perform_action(&mut agent);
        assert_eq!(action, FeatureAction::Hold(3));
        assert_eq!(agent.hold_time(), 3);
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use ms_core::GridPoint;
    use ms_grid::{Terrain, TerrainBuilder};

    use super::helpers::bfs_steps;
    use crate::{Neighborhood, PlannerConfig, TacticalPlanner, line_clear, simplify};

    const SIDE: usize = 8;

    fn terrain(walls: &[bool]) -> Terrain {
        let mut b = TerrainBuilder::new(SIDE, SIDE);
        for (i, &wall) in walls.iter().enumerate() {
            let q = GridPoint::new((i % SIDE) as i32, (i / SIDE) as i32);
            let corner = i == 0 || i == SIDE * SIDE - 1;
            if wall && !corner {
                b.set_wall(q).unwrap();
            }
        }
        b.build()
    }

    fn walls() -> impl Strategy<Value = Vec<bool>> {
        proptest::collection::vec(proptest::bool::weighted(0.3), SIDE * SIDE)
    }

    proptest! {
        #[test]
        fn astar_matches_bfs(walls in walls()) {
            let t = terrain(&walls);
            let planner = TacticalPlanner::new(PlannerConfig {
                heuristic_factor: 1,
                neighborhood: Neighborhood::VonNeumann,
                ..Default::default()
            });
            let from = GridPoint::new(0, 0);
            let to = GridPoint::new(SIDE as i32 - 1, SIDE as i32 - 1);
            let path = planner.find_path(&t, from, to);
            match bfs_steps(&t, from, to) {
                Some(steps) => prop_assert_eq!(path.len(), steps + 1),
                None => prop_assert!(path.is_empty()),
            }
        }

        #[test]
        fn simplified_waypoints_see_each_other(walls in walls(), moore in any::<bool>()) {
            let t = terrain(&walls);
            let planner = TacticalPlanner::new(PlannerConfig {
                neighborhood: if moore { Neighborhood::Moore } else { Neighborhood::VonNeumann },
                ..Default::default()
            });
            let from = GridPoint::new(0, 0);
            let to = GridPoint::new(SIDE as i32 - 1, SIDE as i32 - 1);
            let path = planner.find_path(&t, from, to);
            prop_assume!(!path.is_empty());

            let simple = simplify(&t, &path);
            prop_assert_eq!(simple.first(), Some(&from));
            prop_assert_eq!(simple.last(), Some(&to));
            for pair in simple.windows(2) {
                prop_assert!(pair[0] != pair[1]);
                prop_assert!(line_clear(&t, pair[0], pair[1]));
            }
        }
    }
}

// ── Worker pool ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool {
    use std::collections::HashSet;
    use std::sync::Arc;

    use ms_core::AgentId;

    use super::helpers::{mall_20, p};
    use crate::{PlanRequest, PlannerConfig, PoolConfig, TacticalError, TacticalPlanner, TacticalPool};

    fn pool(workers: usize, queue_capacity: usize) -> (TacticalPool, Arc<TacticalPlanner>, Arc<ms_grid::Terrain>) {
        let planner = Arc::new(TacticalPlanner::new(PlannerConfig::default()));
        let terrain = Arc::new(mall_20());
        let pool = TacticalPool::spawn(
            &PoolConfig { workers, queue_capacity },
            Arc::clone(&planner),
            Arc::clone(&terrain),
        )
        .unwrap();
        (pool, planner, terrain)
    }

    fn request(id: u64) -> PlanRequest {
        PlanRequest { agent: AgentId(id), origin: p((id % 20) as i32, 0), attempt: 1, seed: 9 }
    }

    #[test]
    fn drains_more_requests_than_queue_capacity() {
        let (mut pool, _, _) = pool(3, 1);
        let k = 25;
        for id in 0..k {
            pool.submit(request(id)).unwrap();
        }
        let mut seen = HashSet::new();
        while pool.outstanding() > 0 {
            let result = pool.recv().unwrap();
            assert!(seen.insert(result.agent), "duplicate result for {}", result.agent);
        }
        assert_eq!(seen.len(), k as usize);
        pool.shutdown();
    }

    #[test]
    fn results_match_inline_planning() {
        let (mut pool, planner, terrain) = pool(2, 2);
        let req = request(4);
        pool.submit(req.clone()).unwrap();
        let result = pool.recv().unwrap();
        assert_eq!(result, planner.serve(&terrain, &req));
    }

    #[test]
    fn closed_pool_rejects_work() {
        let (mut pool, _, _) = pool(2, 1);
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
        assert!(matches!(pool.submit(request(1)), Err(TacticalError::PoolClosed)));
        assert!(matches!(pool.recv(), Err(TacticalError::PoolClosed)));
        pool.shutdown();
    }

    #[test]
    fn try_recv_counts_down() {
        let (mut pool, _, _) = pool(1, 1);
        pool.submit(request(1)).unwrap();
        let first = pool.recv().unwrap();
        assert_eq!(first.agent, AgentId(1));
        assert_eq!(pool.outstanding(), 0);
        assert!(pool.try_recv().is_none());
        assert!(pool.drain().is_empty());
    }

    #[test]
    fn drop_joins_idle_workers() {
        let (pool, _, _) = pool(4, 5);
        drop(pool);
    }
}
