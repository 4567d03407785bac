//! Tactical worker pool.
//!
//! The scheduler thread pushes [`PlanRequest`]s into a bounded crossbeam
//! queue; `workers` named threads pop them, run the planner against the
//! shared terrain snapshot, and push [`PlanResult`]s into an unbounded
//! result channel that the scheduler drains at the start of each tick.
//!
//! ```text
//!   scheduler ──submit──▶ [jobs: bounded(queue_capacity)] ──▶ worker × N
//!       ▲                                                          │
//!       └────────try_recv / recv──── [results: unbounded] ◀────────┘
//! ```
//!
//! A full job queue blocks `submit`, which is what throttles agent
//! generation when planning falls behind.  Workers never block on the
//! result side, so the pool cannot deadlock however small the queue is.
//!
//! Shutdown sends one `Shutdown` job per worker and joins every thread;
//! a worker parked on an empty queue wakes up on that job.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, warn};

use ms_core::{AgentId, GridPoint};
use ms_grid::Terrain;

use crate::{PoolConfig, TacticalError, TacticalPlanner, TacticalResult};

// ── Messages ──────────────────────────────────────────────────────────────────

/// Ask for a route for `agent`, currently standing at `origin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanRequest {
    pub agent:   AgentId,
    pub origin:  GridPoint,
    /// 1-based count of requests made for this agent so far.
    pub attempt: u32,
    /// Run seed; combined with `agent` and `attempt` into the request RNG.
    pub seed:    u64,
}

/// A finished planning request.  An empty `route` means "no path".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanResult {
    pub agent:   AgentId,
    pub route:   Vec<GridPoint>,
    pub attempt: u32,
}

enum Job {
    Plan(PlanRequest),
    Shutdown,
}

// ── TacticalPool ──────────────────────────────────────────────────────────────

pub struct TacticalPool {
    jobs:        Sender<Job>,
    results:     Receiver<PlanResult>,
    workers:     Vec<JoinHandle<()>>,
    outstanding: usize,
}

impl TacticalPool {
    /// Start `config.workers` planner threads over `terrain`.
    pub fn spawn(
        config:  &PoolConfig,
        planner: Arc<TacticalPlanner>,
        terrain: Arc<Terrain>,
    ) -> TacticalResult<Self> {
        config.validate()?;
        let (job_tx, job_rx) = crossbeam_channel::bounded(config.queue_capacity);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let mut pool = Self {
            jobs:        job_tx,
            results:     result_rx,
            workers:     Vec::with_capacity(config.workers),
            outstanding: 0,
        };

        for index in 0..config.workers {
            let jobs    = job_rx.clone();
            let results = result_tx.clone();
            let planner = Arc::clone(&planner);
            let terrain = Arc::clone(&terrain);
            // On failure `pool` drops here and stops the threads already running.
            let handle = thread::Builder::new()
                .name(format!("ms-tactical-{index}"))
                .spawn(move || worker_loop(index, jobs, results, planner, terrain))?;
            pool.workers.push(handle);
        }

        debug!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "tactical pool started"
        );
        Ok(pool)
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Requests submitted whose results have not been received yet.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Queue a request, blocking while the queue is full.
    pub fn submit(&mut self, request: PlanRequest) -> TacticalResult<()> {
        self.jobs
            .send(Job::Plan(request))
            .map_err(|_| TacticalError::PoolClosed)?;
        self.outstanding += 1;
        Ok(())
    }

    /// Next finished result, if one is ready.
    pub fn try_recv(&mut self) -> Option<PlanResult> {
        match self.results.try_recv() {
            Ok(result) => {
                self.outstanding -= 1;
                Some(result)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the next result arrives.
    ///
    /// Fails with [`TacticalError::PoolClosed`] when nothing is outstanding
    /// or every worker has exited.
    pub fn recv(&mut self) -> TacticalResult<PlanResult> {
        if self.outstanding == 0 {
            return Err(TacticalError::PoolClosed);
        }
        let result = self.results.recv().map_err(|_| TacticalError::PoolClosed)?;
        self.outstanding -= 1;
        Ok(result)
    }

    /// Every result that is ready right now.
    pub fn drain(&mut self) -> Vec<PlanResult> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stop every worker and wait for it.  Idempotent.
    ///
    /// Requests still queued ahead of the shutdown jobs are planned first;
    /// their results stay receivable until the pool is dropped.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        for _ in 0..self.workers.len() {
            if self.jobs.send(Job::Shutdown).is_err() {
                break;
            }
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("tactical worker panicked");
            }
        }
        debug!(outstanding = self.outstanding, "tactical pool stopped");
    }
}

impl Drop for TacticalPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

fn worker_loop(
    index:   usize,
    jobs:    Receiver<Job>,
    results: Sender<PlanResult>,
    planner: Arc<TacticalPlanner>,
    terrain: Arc<Terrain>,
) {
    debug!(worker = index, "tactical worker started");
    let mut planned = 0u64;

    while let Ok(job) = jobs.recv() {
        let request = match job {
            Job::Plan(request) => request,
            Job::Shutdown => break,
        };
        let result = planner.serve(&terrain, &request);
        planned += 1;
        if results.send(result).is_err() {
            break;
        }
    }

    debug!(worker = index, planned, "tactical worker stopped");
}
