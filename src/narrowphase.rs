use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Rays shorter than this along a local axis are treated as parallel to it.
pub const PARALLEL_EPS: f32 = 1e-6;

/// Narrowphase primitive tests (SAT over each box's own two axes).
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn project_radius(half_extents: Vec2, axis: Vec2, onto: Vec2) -> f32 {
        onto.dot(axis).abs() * half_extents.x + onto.dot(axis.perp()).abs() * half_extents.y
    }

    fn obb_mtv(a: &Obb, b: &Obb) -> Option<Mtv> {
        let d = b.center - a.center;
        let axes = [a.axis, a.axis.perp(), b.axis, b.axis.perp()];

        let mut best = Mtv { axis: Vec2::ZERO, overlap: f32::INFINITY };
        for axis in axes {
            let ra = Self::project_radius(a.half_extents, a.axis, axis);
            let rb = Self::project_radius(b.half_extents, b.axis, axis);
            let dist = d.dot(axis);
            let overlap = (ra + rb) - dist.abs();
            if overlap < 0.0 {
                return None;
            }
            if overlap < best.overlap {
                // Orient from A toward B
                let axis = if dist < 0.0 { -axis } else { axis };
                best = Mtv { axis, overlap };
            }
        }
        Some(best)
    }

    fn aabb_overlap(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Option<Mtv> {
        let d = c1 - c0;
        let ox = (h0.x + h1.x) - d.x.abs();
        let oy = (h0.y + h1.y) - d.y.abs();
        if ox < 0.0 || oy < 0.0 {
            return None;
        }

        // Axis of minimum penetration, X wins ties
        if ox <= oy {
            let nx = if d.x < 0.0 { -1.0 } else { 1.0 };
            Some(Mtv { axis: Vec2::new(nx, 0.0), overlap: ox })
        } else {
            let ny = if d.y < 0.0 { -1.0 } else { 1.0 };
            Some(Mtv { axis: Vec2::new(0.0, ny), overlap: oy })
        }
    }

    fn point_in_obb(p: Vec2, obb: &Obb) -> bool {
        let local = obb.to_local(p);
        local.x.abs() <= obb.half_extents.x && local.y.abs() <= obb.half_extents.y
    }

    fn ray_obb(origin: Vec2, dir: Vec2, obb: &Obb) -> Option<f32> {
        // Slab method in the box's local frame
        let o = obb.to_local(origin);
        let d = obb.dir_to_local(dir);
        let e = obb.half_extents;
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;

        for (o_k, d_k, e_k) in [(o.x, d.x, e.x), (o.y, d.y, e.y)] {
            if d_k.abs() < PARALLEL_EPS {
                if o_k < -e_k || o_k > e_k {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d_k;
            let mut t1 = (-e_k - o_k) * inv;
            let mut t2 = (e_k - o_k) * inv;
            if t1 > t2 {
                core::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return None;
            }
        }

        // Origin inside the box: report the exit distance
        let t = if tmin >= 0.0 {
            tmin
        } else if tmax >= 0.0 {
            tmax
        } else {
            return None;
        };
        t.is_finite().then_some(t)
    }
}

/// Translation for body A after touching B: push out along the MTV, then
/// keep a damped share of the velocity along the contact tangent.
pub fn slide_correction(mtv: Mtv, velocity: Vec2, friction: f32, dt: f32) -> Vec2 {
    let tangent = mtv.axis.perp().normalize_or_zero();
    let slide = tangent * velocity.dot(tangent) * friction * dt;
    mtv.push_a() + slide
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_obb_mtv_aligned_basic() {
        let a = Obb::aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Obb::aligned(Vec2::new(1.5, 0.0), Vec2::new(1.0, 1.0));
        let m = Narrowphase::obb_mtv(&a, &b).unwrap();
        assert!((m.overlap - 0.5).abs() < 1e-5);
        // Points from A toward B
        assert!((m.axis.x - 1.0).abs() < 1e-5);
        assert!(m.axis.y.abs() < 1e-5);
    }

    #[test]
    fn test_obb_mtv_axis_flips_toward_b() {
        let a = Obb::aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Obb::aligned(Vec2::new(0.0, -1.8), Vec2::new(1.0, 1.0));
        let m = Narrowphase::obb_mtv(&a, &b).unwrap();
        assert!((m.overlap - 0.2).abs() < 1e-5);
        assert!((m.axis.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_obb_mtv_separated() {
        let a = Obb::aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Obb::aligned(Vec2::new(3.1, 0.0), Vec2::new(1.0, 1.0));
        assert!(Narrowphase::obb_mtv(&a, &b).is_none());
    }

    #[test]
    fn test_obb_mtv_touching_counts() {
        let a = Obb::aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Obb::aligned(Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.0));
        let m = Narrowphase::obb_mtv(&a, &b).unwrap();
        assert!(m.overlap.abs() < 1e-5);
    }

    #[test]
    fn test_obb_mtv_rotated_diamond_separates() {
        // AABB test would report overlap; the diamond's own axes separate them.
        let a = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        let b = Obb::rotated(Vec2::new(2.3, 2.3), Vec2::splat(1.0), 45.0);
        assert!(Narrowphase::aabb_overlap(a.center, a.half_extents, b.center, Vec2::splat(2f32.sqrt())).is_some());
        assert!(Narrowphase::obb_mtv(&a, &b).is_none());
    }

    #[test]
    fn test_obb_mtv_rotated_overlap_resolves() {
        let a = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        let b = Obb::rotated(Vec2::new(2.0, 0.3), Vec2::splat(1.0), 30.0);
        let m = Narrowphase::obb_mtv(&a, &b).unwrap();
        assert!(m.overlap > 0.0);
        assert!((m.axis.length() - 1.0).abs() < 1e-5);
        // Moving B along the axis by the overlap (plus slack) separates them.
        let moved = Obb { center: b.center + m.push_b() * 1.001 + m.axis * 1e-4, ..b };
        assert!(Narrowphase::obb_mtv(&a, &moved).is_none());
    }

    #[test]
    fn test_obb_mtv_degenerate_box() {
        // Zero-extent box sitting inside A still collides.
        let a = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        let p = Obb::aligned(Vec2::new(0.5, 0.2), Vec2::ZERO);
        let m = Narrowphase::obb_mtv(&a, &p).unwrap();
        assert!((m.overlap - 0.5).abs() < 1e-5);
        let far = Obb::aligned(Vec2::new(1.5, 0.0), Vec2::ZERO);
        assert!(Narrowphase::obb_mtv(&a, &far).is_none());
    }

    #[test]
    fn test_point_in_obb_rotated() {
        let b = Obb::rotated(Vec2::ZERO, Vec2::new(2.0, 0.5), 90.0);
        assert!(Narrowphase::point_in_obb(Vec2::new(0.0, 1.9), &b));
        assert!(!Narrowphase::point_in_obb(Vec2::new(1.9, 0.0), &b));
    }

    // --- Rays --------------------------------------------------------------

    #[test]
    fn test_ray_obb_hit() {
        let b = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        let t = Narrowphase::ray_obb(Vec2::new(-5.0, 0.0), Vec2::X, &b).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_obb_parallel_miss() {
        let b = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        assert!(Narrowphase::ray_obb(Vec2::new(-5.0, 2.0), Vec2::X, &b).is_none());
    }

    #[test]
    fn test_ray_obb_behind_origin() {
        let b = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        assert!(Narrowphase::ray_obb(Vec2::new(5.0, 0.0), Vec2::X, &b).is_none());
    }

    #[test]
    fn test_ray_obb_inside_reports_exit() {
        let b = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        let t = Narrowphase::ray_obb(Vec2::new(0.5, 0.0), Vec2::X, &b).unwrap();
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_ray_obb_rotated_box() {
        // Square turned 45°: its corner faces the ray at distance 5 - sqrt(2).
        let b = Obb::rotated(Vec2::new(5.0, 0.0), Vec2::splat(1.0), 45.0);
        let t = Narrowphase::ray_obb(Vec2::ZERO, Vec2::X, &b).unwrap();
        assert!((t - (5.0 - 2f32.sqrt())).abs() < 1e-4);
    }

    #[test]
    fn test_slide_correction_pushes_out_and_slides() {
        let a = Obb::aligned(Vec2::ZERO, Vec2::splat(1.0));
        let wall = Obb::aligned(Vec2::new(1.5, 0.0), Vec2::splat(1.0));
        let m = Narrowphase::obb_mtv(&a, &wall).unwrap();
        let delta = slide_correction(m, Vec2::new(3.0, 2.0), 0.5, 1.0);
        // Pushed back by the overlap, keeps half the tangential speed.
        assert!((delta.x + 0.5).abs() < 1e-5);
        assert!((delta.y - 1.0).abs() < 1e-5);
        let moved = Obb { center: a.center + Vec2::new(delta.x, 0.0), ..a };
        let after = Narrowphase::obb_mtv(&moved, &wall).map(|m| m.overlap).unwrap_or(0.0);
        assert!(after < 1e-5);
    }

    proptest! {
        #[test]
        fn aligned_obb_agrees_with_aabb(
            cx in -6.0f32..6.0, cy in -6.0f32..6.0,
            h0x in 0.0f32..3.0, h0y in 0.0f32..3.0,
            h1x in 0.0f32..3.0, h1y in 0.0f32..3.0,
        ) {
            let c1 = Vec2::new(cx, cy);
            let (h0, h1) = (Vec2::new(h0x, h0y), Vec2::new(h1x, h1y));
            let sat = Narrowphase::obb_mtv(&Obb::aligned(Vec2::ZERO, h0), &Obb::aligned(c1, h1));
            let direct = Narrowphase::aabb_overlap(Vec2::ZERO, h0, c1, h1);
            prop_assert_eq!(sat.is_some(), direct.is_some());
            if let (Some(s), Some(d)) = (sat, direct) {
                prop_assert!((s.overlap - d.overlap).abs() < 1e-4);
                prop_assert!((s.axis - d.axis).length() < 1e-4);
            }
        }
    }
}
