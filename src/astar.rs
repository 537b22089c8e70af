//! 4-connected grid A* and string-pulling path simplification.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use glam::IVec2;

use crate::grid::Grid;

const NEIGHBOURS: [IVec2; 4] = [IVec2::new(1, 0), IVec2::new(-1, 0), IVec2::new(0, 1), IVec2::new(0, -1)];

/// Expansions between two looks at the cancel flag.
const CANCEL_CHECK_INTERVAL: usize = 256;

fn manhattan(a: IVec2, b: IVec2) -> u32 {
    (a - b).abs().element_sum() as u32
}

/// Frontier entry. Lowest `f` pops first; equal `f` pops in insertion order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    seq: u64,
    cell: IVec2,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest 4-connected path from `start` to `goal`, both included.
///
/// Empty when either end is blocked or out of bounds, or when no route exists.
pub fn find_path(grid: &Grid, start: IVec2, goal: IVec2) -> Vec<IVec2> {
    find_path_with(grid, start, goal, &AtomicBool::new(false))
}

/// [`find_path`] that gives up (empty result) once `cancel` is raised.
pub fn find_path_with(grid: &Grid, start: IVec2, goal: IVec2, cancel: &AtomicBool) -> Vec<IVec2> {
    if grid.is_blocked(start) || grid.is_blocked(goal) || cancel.load(AtomicOrdering::Relaxed) {
        return Vec::new();
    }

    let width = grid.width();
    let index = |c: IVec2| c.y as usize * width + c.x as usize;
    let n = width * grid.height();

    let mut g = vec![u32::MAX; n];
    let mut parent: Vec<Option<IVec2>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    g[index(start)] = 0;
    open.push(OpenNode { f: manhattan(start, goal), seq, cell: start });

    while let Some(OpenNode { cell, .. }) = open.pop() {
        if cell == goal {
            return reconstruct(&parent, index, goal);
        }
        let i = index(cell);
        if closed[i] {
            continue;
        }
        closed[i] = true;

        expanded += 1;
        if expanded % CANCEL_CHECK_INTERVAL == 0 && cancel.load(AtomicOrdering::Relaxed) {
            return Vec::new();
        }

        for step in NEIGHBOURS {
            let next = cell + step;
            if grid.is_blocked(next) {
                continue;
            }
            let j = index(next);
            if closed[j] {
                continue;
            }
            let tentative = g[i] + 1;
            if tentative < g[j] {
                g[j] = tentative;
                parent[j] = Some(cell);
                seq += 1;
                open.push(OpenNode { f: tentative + manhattan(next, goal), seq, cell: next });
            }
        }
    }
    Vec::new()
}

fn reconstruct(parent: &[Option<IVec2>], index: impl Fn(IVec2) -> usize, goal: IVec2) -> Vec<IVec2> {
    let mut path = vec![goal];
    let mut at = goal;
    while let Some(prev) = parent[index(at)] {
        path.push(prev);
        at = prev;
    }
    path.reverse();
    path
}

/// Greedy line-of-sight simplification: from each anchor jump to the
/// farthest later waypoint reachable by an unobstructed straight line.
pub fn string_pull(grid: &Grid, path: &[IVec2]) -> Vec<IVec2> {
    let n = path.len();
    if n < 2 {
        return path.to_vec();
    }

    let mut out = Vec::with_capacity(n);
    out.push(path[0]);
    let mut i = 0;
    while i + 1 < n {
        let best = (i + 2..n)
            .rev()
            .find(|&j| !grid.line_blocked(path[i], path[j]))
            .unwrap_or(i + 1);
        out.push(path[best]);
        i = best;
    }
    out
}

/// Deltas between consecutive waypoints.
pub fn relative_steps(path: &[IVec2]) -> Vec<IVec2> {
    path.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Total grid-step (Manhattan) length of a path.
pub fn path_cost(path: &[IVec2]) -> u32 {
    path.windows(2).map(|w| manhattan(w[0], w[1])).sum()
}
