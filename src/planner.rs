//! Off-thread path planning: requests run on a worker pool and are polled
//! from the simulation thread without blocking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use glam::{IVec2, Vec2};

use crate::astar::{find_path_with, string_pull};
use crate::error::NavError;
use crate::grid::{Grid, GridMapping, GridRect};
use crate::types::NavConfig;

/// Search, simplify and convert to world-space cell centers.
///
/// Synchronous; this is the body of every planner task.
pub fn plan_path(
    grid: &Grid,
    mapping: &GridMapping,
    start: IVec2,
    goal: IVec2,
    cancel: &AtomicBool,
) -> Vec<Vec2> {
    let raw = find_path_with(grid, start, goal, cancel);
    string_pull(grid, &raw)
        .into_iter()
        .map(|cell| mapping.grid_to_world(cell))
        .collect()
}

/// Planner for one level: immutable grid snapshot plus a worker pool.
pub struct PathPlanner {
    pool: rayon::ThreadPool,
    grid: Arc<Grid>,
    mapping: GridMapping,
    next_request: AtomicU64,
}

impl PathPlanner {
    pub fn new(grid: Arc<Grid>, cfg: &NavConfig) -> Result<Self, NavError> {
        let mapping = GridMapping::for_grid(&grid, cfg.level_scale)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.worker_threads)
            .thread_name(|i| format!("path-planner-{i}"))
            .panic_handler(|payload| {
                let msg = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic>");
                tracing::warn!(panic = msg, "path planner task panicked");
            })
            .build()?;
        tracing::debug!(
            width = grid.width(),
            height = grid.height(),
            scale = cfg.level_scale,
            workers = pool.current_num_threads(),
            "path planner ready"
        );
        Ok(Self { pool, grid, mapping, next_request: AtomicU64::new(0) })
    }

    /// Rasterize `rects` into a `cfg.grid_width` × `cfg.grid_height` grid and plan on it.
    pub fn from_rects(rects: &[GridRect], cfg: &NavConfig) -> Result<Self, NavError> {
        let grid = Grid::from_rects(cfg.grid_width, cfg.grid_height, rects)?;
        Self::new(Arc::new(grid), cfg)
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn mapping(&self) -> &GridMapping {
        &self.mapping
    }

    /// Swap level geometry for future requests. In-flight requests keep the
    /// snapshot they started with.
    pub fn set_grid(&mut self, grid: Arc<Grid>) -> Result<(), NavError> {
        self.mapping = GridMapping::for_grid(&grid, self.mapping.scale())?;
        self.grid = grid;
        Ok(())
    }

    /// Start planning from `start` to `goal` (world coordinates).
    pub fn request_path(&self, start: Vec2, goal: Vec2) -> PathHandle {
        let id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let start_cell = self.mapping.world_to_grid(start);
        let goal_cell = self.mapping.world_to_grid(goal);
        let (tx, rx) = crossbeam_channel::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));

        let grid = Arc::clone(&self.grid);
        let mapping = self.mapping;
        let task_cancel = Arc::clone(&cancel);
        tracing::debug!(request = id, start = ?start_cell, goal = ?goal_cell, "path requested");

        self.pool.spawn(move || {
            let t0 = Instant::now();
            let waypoints = plan_path(&grid, &mapping, start_cell, goal_cell, &task_cancel);
            if task_cancel.load(Ordering::Relaxed) {
                tracing::trace!(request = id, "path request cancelled");
                return;
            }
            tracing::debug!(
                request = id,
                waypoints = waypoints.len(),
                elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
                "path ready"
            );
            if tx.send(waypoints).is_err() {
                tracing::trace!(request = id, "path handle dropped before delivery");
            }
        });

        PathHandle { id, rx, cancel, consumed: false }
    }

    /// Plan on the calling thread.
    pub fn plan_now(&self, start: Vec2, goal: Vec2) -> Vec<Vec2> {
        plan_path(
            &self.grid,
            &self.mapping,
            self.mapping.world_to_grid(start),
            self.mapping.world_to_grid(goal),
            &AtomicBool::new(false),
        )
    }
}

/// Pending result of one path request. Yields its waypoints exactly once;
/// dropping it cancels the request.
#[derive(Debug)]
pub struct PathHandle {
    id: u64,
    rx: Receiver<Vec<Vec2>>,
    cancel: Arc<AtomicBool>,
    consumed: bool,
}

impl PathHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once the result has been handed out.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Non-blocking check. `Some` exactly once, when the result is ready;
    /// an empty path means "no path".
    pub fn poll(&mut self) -> Option<Vec<Vec2>> {
        if self.consumed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(path) => Some(self.take(path)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.lost()),
        }
    }

    /// Block up to `timeout` for the result.
    pub fn wait(&mut self, timeout: Duration) -> Option<Vec<Vec2>> {
        if self.consumed {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(path) => Some(self.take(path)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.lost()),
        }
    }

    /// Abandon the request; its result will never be delivered.
    pub fn cancel(self) {}

    fn take(&mut self, path: Vec<Vec2>) -> Vec<Vec2> {
        self.consumed = true;
        path
    }

    fn lost(&mut self) -> Vec<Vec2> {
        tracing::warn!(request = self.id, "path worker exited without a result");
        self.consumed = true;
        Vec::new()
    }
}

impl Drop for PathHandle {
    fn drop(&mut self) {
        if !self.consumed {
            self.cancel.store(true, Ordering::Relaxed);
        }
    }
}
