//! Static occupancy grid for navigation and its world ↔ cell mapping.

use glam::{IVec2, Vec2};
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid must have a non-zero width and height (got {width}x{height})")]
    Empty { width: usize, height: usize },
    #[error("world scale must be finite and positive (got {0})")]
    InvalidScale(f32),
}

/// Axis-aligned rectangle in cell units: top-left corner plus size.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Wall collider covering exactly the cells this rect rasterizes to.
    pub fn to_wall_body(&self, id: BodyId, mapping: &GridMapping) -> Body {
        let s = mapping.scale();
        let (hx, hy) = mapping.half_cells();
        let cx = self.x as f32 + self.w as f32 * 0.5 - hx;
        let cy = self.y as f32 + self.h as f32 * 0.5 - hy;
        let half = Vec2::new(self.w.max(0) as f32, self.h.max(0) as f32) * 0.5 * s;
        Body::new(id, Vec2::new(cx, cy) * s, half).with_flags(flag::WALL)
    }
}

/// Boolean occupancy map, row-major, `true` = blocked. Immutable once shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Fully open grid.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }
        Ok(Self { width, height, cells: vec![false; width * height] })
    }

    /// Rasterize level rectangles; parts outside the grid are clipped.
    pub fn from_rects(width: usize, height: usize, rects: &[GridRect]) -> Result<Self, GridError> {
        let mut grid = Self::new(width, height)?;
        let (w, h) = (width as i64, height as i64);
        for r in rects {
            let x0 = (r.x as i64).max(0);
            let y0 = (r.y as i64).max(0);
            let x1 = (r.x as i64 + r.w as i64).min(w);
            let y1 = (r.y as i64 + r.h as i64).min(h);
            for y in y0..y1 {
                for x in x0..x1 {
                    grid.cells[y as usize * width + x as usize] = true;
                }
            }
        }
        tracing::debug!(
            width,
            height,
            rects = rects.len(),
            blocked = grid.blocked_count(),
            "occupancy grid built"
        );
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        self.in_bounds(cell).then(|| cell.y as usize * self.width + cell.x as usize)
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, cell: IVec2) -> bool {
        self.index(cell).is_none_or(|i| self.cells[i])
    }

    /// No-op for out-of-bounds cells.
    pub fn set_blocked(&mut self, cell: IVec2, blocked: bool) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = blocked;
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn clamp_cell(&self, cell: IVec2) -> IVec2 {
        cell.clamp(IVec2::ZERO, IVec2::new(self.width as i32 - 1, self.height as i32 - 1))
    }

    /// Bresenham walk from `a` to `b` (both clamped into the grid); true if
    /// any visited cell, ends included, is blocked.
    pub fn line_blocked(&self, a: IVec2, b: IVec2) -> bool {
        let IVec2 { x: mut x0, y: mut y0 } = self.clamp_cell(a);
        let IVec2 { x: x1, y: y1 } = self.clamp_cell(b);

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = (y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            if self.is_blocked(IVec2::new(x0, y0)) {
                return true;
            }
            if x0 == x1 && y0 == y1 {
                return false;
            }
            let e2 = err * 2;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Conversion between world coordinates and cell indices.
///
/// The world origin sits at the middle of the grid; `scale` is the world
/// size of one cell. World → cell truncates and clamps, so it is lossy;
/// cell → world lands on the cell center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridMapping {
    width: usize,
    height: usize,
    scale: f32,
}

impl GridMapping {
    pub fn new(width: usize, height: usize, scale: f32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GridError::InvalidScale(scale));
        }
        Ok(Self { width, height, scale })
    }

    pub fn for_grid(grid: &Grid, scale: f32) -> Result<Self, GridError> {
        Self::new(grid.width(), grid.height(), scale)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Offset between cell indices and world-origin-centered cell units.
    pub fn half_cells(&self) -> (f32, f32) {
        ((self.width as f32 - 1.0) * 0.5, (self.height as f32 - 1.0) * 0.5)
    }

    pub fn world_to_grid(&self, w: Vec2) -> IVec2 {
        let (hx, hy) = self.half_cells();
        let gx = w.x / self.scale + hx;
        let gy = w.y / self.scale + hy;
        // `as` truncates toward zero and saturates on overflow
        IVec2::new(
            (gx as i32).clamp(0, self.width as i32 - 1),
            (gy as i32).clamp(0, self.height as i32 - 1),
        )
    }

    pub fn grid_to_world(&self, cell: IVec2) -> Vec2 {
        let (hx, hy) = self.half_cells();
        Vec2::new(
            (cell.x as f32 - hx + 0.5) * self.scale,
            (cell.y as f32 - hy + 0.5) * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_rejected() {
        assert_eq!(Grid::new(0, 5), Err(GridError::Empty { width: 0, height: 5 }));
        assert!(matches!(GridMapping::new(10, 10, 0.0), Err(GridError::InvalidScale(_))));
        assert!(matches!(GridMapping::new(10, 10, f32::NAN), Err(GridError::InvalidScale(_))));
    }

    #[test]
    fn test_from_rects_marks_and_clips() {
        let rects = [GridRect::new(1, 1, 2, 3), GridRect::new(8, 8, 5, 5), GridRect::new(-3, 0, 4, 1)];
        let g = Grid::from_rects(10, 10, &rects).unwrap();
        assert!(g.is_blocked(IVec2::new(1, 1)));
        assert!(g.is_blocked(IVec2::new(2, 3)));
        assert!(!g.is_blocked(IVec2::new(3, 1)));
        assert!(!g.is_blocked(IVec2::new(1, 4)));
        // Clipped at the far edge
        assert!(g.is_blocked(IVec2::new(9, 9)));
        // Clipped at the near edge: x in [-3, 1) -> cell 0 only
        assert!(g.is_blocked(IVec2::new(0, 0)));
        assert!(!g.is_blocked(IVec2::new(1, 0)));
        assert_eq!(g.blocked_count(), 6 + 4 + 1);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let g = Grid::new(4, 4).unwrap();
        assert!(g.is_blocked(IVec2::new(-1, 0)));
        assert!(g.is_blocked(IVec2::new(0, 4)));
        assert!(!g.is_blocked(IVec2::new(3, 3)));
    }

    #[test]
    fn test_line_blocked() {
        let mut g = Grid::new(10, 10).unwrap();
        assert!(!g.line_blocked(IVec2::new(0, 0), IVec2::new(9, 9)));
        g.set_blocked(IVec2::new(5, 5), true);
        assert!(g.line_blocked(IVec2::new(0, 0), IVec2::new(9, 9)));
        assert!(!g.line_blocked(IVec2::new(0, 9), IVec2::new(9, 9)));
        // Endpoint itself counts
        assert!(g.line_blocked(IVec2::new(5, 0), IVec2::new(5, 5)));
    }

    #[test]
    fn test_mapping_round_trip_cell_centers() {
        let m = GridMapping::new(100, 100, 32.0).unwrap();
        for cell in [IVec2::new(0, 0), IVec2::new(49, 50), IVec2::new(99, 99), IVec2::new(13, 77)] {
            assert_eq!(m.world_to_grid(m.grid_to_world(cell)), cell);
        }
        let odd = GridMapping::new(7, 5, 0.25).unwrap();
        for y in 0..5 {
            for x in 0..7 {
                let cell = IVec2::new(x, y);
                assert_eq!(odd.world_to_grid(odd.grid_to_world(cell)), cell);
            }
        }
    }

    #[test]
    fn test_mapping_clamps() {
        let m = GridMapping::new(100, 100, 10.0).unwrap();
        assert_eq!(m.world_to_grid(Vec2::new(-1e6, 1e6)), IVec2::new(0, 99));
        assert_eq!(m.world_to_grid(Vec2::ZERO), IVec2::new(49, 49));
    }

    #[test]
    fn test_wall_body_covers_rect_cells() {
        let m = GridMapping::new(10, 10, 2.0).unwrap();
        let r = GridRect::new(2, 3, 4, 2);
        let body = r.to_wall_body(BodyId(9), &m);
        assert!(body.has_flag(flag::WALL));
        // Every rasterized cell center lies inside the wall; neighbours do not.
        for y in 3..5 {
            for x in 2..6 {
                let p = m.grid_to_world(IVec2::new(x, y));
                assert!((p - body.center).abs().cmple(body.half_extents).all());
            }
        }
        let outside = m.grid_to_world(IVec2::new(6, 3));
        assert!(!(outside - body.center).abs().cmple(body.half_extents).all());
    }
}
