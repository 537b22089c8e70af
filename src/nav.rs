use glam::Vec2;

use crate::error::NavError;
use crate::planner::{PathHandle, PathPlanner};

/// Per-agent path following with at most one outstanding planner request.
///
/// While a request is computing the agent keeps following its previous
/// path; the new one replaces it on the `poll` that receives it.
#[derive(Debug, Default)]
pub struct Navigator {
    pending: Option<PathHandle>,
    path: Vec<Vec2>,
    index: usize,
    arrive_radius: f32,
}

impl Navigator {
    pub fn new(arrive_radius: f32) -> Self {
        Self { arrive_radius: arrive_radius.max(0.0), ..Self::default() }
    }

    /// Ask for a route from `from` to `to`. Fails with [`NavError::Busy`]
    /// while a previous request is still in flight.
    pub fn request(&mut self, planner: &PathPlanner, from: Vec2, to: Vec2) -> Result<(), NavError> {
        if self.pending.is_some() {
            return Err(NavError::Busy);
        }
        self.pending = Some(planner.request_path(from, to));
        Ok(())
    }

    /// Install a finished path if one arrived. Returns true when the path changed.
    pub fn poll(&mut self) -> bool {
        let Some(handle) = self.pending.as_mut() else { return false };
        let Some(path) = handle.poll() else { return false };
        if path.is_empty() {
            tracing::trace!(request = handle.id(), "no path, agent stays put");
        }
        self.pending = None;
        self.path = path;
        self.index = 0;
        true
    }

    /// Drop the in-flight request; its result is never installed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            tracing::trace!(request = handle.id(), "path request abandoned");
        }
    }

    /// Forget the current path (the pending request, if any, is kept).
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.index = 0;
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Nothing left to follow and nothing computing.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && self.index >= self.path.len()
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    /// Remaining waypoints, current target first.
    pub fn remaining(&self) -> &[Vec2] {
        self.path.get(self.index..).unwrap_or(&[])
    }

    /// Current target for an agent at `position`, skipping every waypoint
    /// already within the arrive radius (boundary inclusive).
    pub fn next_waypoint(&mut self, position: Vec2) -> Option<Vec2> {
        let r2 = self.arrive_radius * self.arrive_radius;
        while let Some(&target) = self.path.get(self.index) {
            if position.distance_squared(target) > r2 {
                return Some(target);
            }
            self.index += 1;
        }
        None
    }
}

/// Rotate `current` toward `desired` (degrees) along the shorter arc by at
/// most `max_step`.
pub fn turn_towards(current: f32, desired: f32, max_step: f32) -> f32 {
    let diff = (desired - current + 540.0).rem_euclid(360.0) - 180.0;
    current + diff.clamp(-max_step, max_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRect;
    use crate::types::NavConfig;
    use std::time::{Duration, Instant};

    fn planner(rects: &[GridRect]) -> PathPlanner {
        let cfg = NavConfig { grid_width: 16, grid_height: 16, worker_threads: 1, ..NavConfig::with_scale(2.0) };
        PathPlanner::from_rects(rects, &cfg).unwrap()
    }

    fn poll_until_installed(nav: &mut Navigator) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !nav.poll() {
            assert!(Instant::now() < deadline, "path never arrived");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_single_outstanding_request() {
        let p = planner(&[]);
        let mut nav = Navigator::new(1.0);
        nav.request(&p, Vec2::ZERO, Vec2::new(10.0, 10.0)).unwrap();
        assert!(nav.is_busy());
        assert!(matches!(nav.request(&p, Vec2::ZERO, Vec2::ONE), Err(NavError::Busy)));
        poll_until_installed(&mut nav);
        assert!(!nav.is_busy());
        assert!(nav.request(&p, Vec2::ZERO, Vec2::ONE).is_ok());
    }

    #[test]
    fn test_follows_waypoints_in_order() {
        let p = planner(&[GridRect::new(8, 0, 1, 12)]);
        let m = *p.mapping();
        let start = m.grid_to_world(glam::IVec2::new(2, 2));
        let goal = m.grid_to_world(glam::IVec2::new(13, 2));
        let mut nav = Navigator::new(0.5);
        nav.request(&p, start, goal).unwrap();
        poll_until_installed(&mut nav);
        let path = nav.path().to_vec();
        assert!(path.len() >= 3);

        // Start cell center is reached immediately.
        let first = nav.next_waypoint(start).unwrap();
        assert_eq!(first, path[1]);
        // Teleporting onto each target advances to the next one.
        let mut pos = first;
        let mut visited = 1;
        while let Some(t) = nav.next_waypoint(pos) {
            pos = t;
            visited += 1;
        }
        assert_eq!(visited, path.len() - 1);
        assert_eq!(pos, goal);
        assert!(nav.is_idle());
    }

    #[test]
    fn test_cancel_discards_result() {
        let p = planner(&[]);
        let mut nav = Navigator::new(1.0);
        nav.request(&p, Vec2::ZERO, Vec2::new(12.0, 0.0)).unwrap();
        nav.cancel();
        assert!(!nav.is_busy());
        std::thread::sleep(Duration::from_millis(20));
        assert!(!nav.poll());
        assert!(nav.path().is_empty());
        assert!(nav.is_idle());
    }

    #[test]
    fn test_keeps_old_path_while_pending() {
        let p = planner(&[]);
        let mut nav = Navigator::new(0.1);
        nav.request(&p, Vec2::ZERO, Vec2::new(12.0, 0.0)).unwrap();
        poll_until_installed(&mut nav);
        let old = nav.path().to_vec();
        nav.request(&p, Vec2::ZERO, Vec2::new(-12.0, 6.0)).unwrap();
        assert_eq!(nav.remaining(), &old[..]);
        poll_until_installed(&mut nav);
        assert_ne!(nav.path(), &old[..]);
    }

    #[test]
    fn test_zero_radius_advances_on_exact_arrival() {
        let mut nav = Navigator::new(0.0);
        nav.path = vec![Vec2::ZERO, Vec2::new(5.0, 0.0)];
        assert_eq!(nav.next_waypoint(Vec2::ZERO), Some(Vec2::new(5.0, 0.0)));
        assert_eq!(nav.next_waypoint(Vec2::new(4.9, 0.0)), Some(Vec2::new(5.0, 0.0)));
        assert_eq!(nav.next_waypoint(Vec2::new(5.0, 0.0)), None);
        assert!(nav.is_idle());
    }

    #[test]
    fn test_turn_towards_shortest_arc() {
        assert!((turn_towards(350.0, 10.0, 720.0) - 370.0).abs() < 1e-4);
        assert!((turn_towards(10.0, 350.0, 5.0) - 5.0).abs() < 1e-4);
        assert!((turn_towards(90.0, 90.0, 5.0) - 90.0).abs() < 1e-4);
    }
}
