//! Stateless spatial queries over a body snapshot: flag-filtered raycasts,
//! point/box probes, and the melee strike built on top of them.

use glam::Vec2;

use crate::api::{DamageTargets, Damageable, NarrowphaseApi};
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Cast a ray from `origin` at `angle` (radians) against every solid body.
///
/// Hits come back sorted by distance. A body whose flags intersect
/// `ignore_mask` is invisible to the ray; a body whose flags intersect
/// `stop_mask` is reported and ends the scan.
pub fn raycast(
    origin: Vec2,
    angle: f32,
    max_distance: f32,
    bodies: &[Body],
    stop_mask: Flags,
    ignore_mask: Flags,
) -> Vec<RayHit> {
    let dir = Vec2::from_angle(angle);
    let mut hits: Vec<RayHit> = bodies
        .iter()
        .filter(|b| b.is_solid())
        .filter_map(|b| {
            let t = Narrowphase::ray_obb(origin, dir, &b.obb())?;
            (t <= max_distance).then(|| RayHit {
                id: b.id,
                distance: t,
                point: origin + dir * t,
                flags: b.flags,
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut out = Vec::with_capacity(hits.len());
    for hit in hits {
        if hit.flags & ignore_mask != 0 {
            continue;
        }
        let stops = hit.flags & stop_mask != 0;
        out.push(hit);
        if stops {
            break;
        }
    }
    out
}

fn mask_allows(flags: Flags, mask: Flags) -> bool {
    mask == 0 || flags & mask != 0
}

/// Solid bodies containing `p` whose flags intersect `mask` (0 = any).
pub fn query_point(p: Vec2, bodies: &[Body], mask: Flags) -> Vec<BodyId> {
    bodies
        .iter()
        .filter(|b| b.is_solid() && mask_allows(b.flags, mask))
        .filter(|b| Narrowphase::point_in_obb(p, &b.obb()))
        .map(|b| b.id)
        .collect()
}

/// Solid bodies overlapping the `probe` box whose flags intersect `mask` (0 = any).
pub fn query_obb(probe: &Obb, bodies: &[Body], mask: Flags) -> Vec<BodyId> {
    bodies
        .iter()
        .filter(|b| b.is_solid() && mask_allows(b.flags, mask))
        .filter(|b| Narrowphase::obb_mtv(probe, &b.obb()).is_some())
        .map(|b| b.id)
        .collect()
}

/// Hit points with a clamped range, the stock `Damageable`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Health {
    pub max: f32,
    pub current: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { max, current: max }
    }

    pub fn set(&mut self, hp: f32) {
        self.current = hp.clamp(0.0, self.max);
    }

    /// Remaining fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 { self.current / self.max } else { 0.0 }
    }
}

impl Damageable for Health {
    fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    fn apply_damage(&mut self, amount: f32) {
        self.set(self.current - amount);
    }
}

/// Apply `amount` to every living damageable body in `hits`.
///
/// Returns how many targets were touched. Bodies without the capability
/// are skipped.
pub fn strike(hits: &[RayHit], amount: f32, targets: &mut impl DamageTargets) -> usize {
    let mut touched = 0;
    for hit in hits {
        let Some(target) = targets.target_mut(hit.id) else { continue };
        if target.is_dead() {
            continue;
        }
        target.apply_damage(amount);
        touched += 1;
    }
    if touched > 0 {
        tracing::trace!(touched, amount, "strike landed");
    }
    touched
}
