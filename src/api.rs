use std::collections::HashMap;

use glam::Vec2;

use crate::types::*;

/// Receiver of contact transitions produced by `CollisionWorld::update`.
///
/// Every callback is addressed to one participant: `body` is the receiver
/// and `other` the body it touches. Each pair transition therefore calls the
/// method twice, once per participant.
pub trait ContactListener {
    fn on_collision_enter(&mut self, _body: BodyId, _other: BodyId, _mtv: Mtv) {}
    fn on_collision_stay(&mut self, _body: BodyId, _other: BodyId, _mtv: Mtv) {}
    fn on_collision_exit(&mut self, _body: BodyId, _other: BodyId) {}
}

/// Ignores every callback; use when only `drain_events` is wanted.
impl ContactListener for () {}

/// Narrowphase primitive signatures.
pub trait NarrowphaseApi {
    // Overlaps --------------------------------------------------------------

    fn project_radius(half_extents: Vec2, axis: Vec2, onto: Vec2) -> f32;
    fn obb_mtv(a: &Obb, b: &Obb) -> Option<Mtv>;
    fn aabb_overlap(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Option<Mtv>;
    fn point_in_obb(p: Vec2, obb: &Obb) -> bool;

    // Rays ------------------------------------------------------------------

    /// Distance along `dir` to the first non-negative intersection.
    fn ray_obb(origin: Vec2, dir: Vec2, obb: &Obb) -> Option<f32>;
}

/// Capability of a gameplay object that can take damage.
pub trait Damageable {
    fn is_dead(&self) -> bool;
    fn apply_damage(&mut self, amount: f32);
}

/// Lookup from body identity to its damage capability, if it has one.
pub trait DamageTargets {
    fn target_mut(&mut self, id: BodyId) -> Option<&mut dyn Damageable>;
}

impl<T: Damageable> DamageTargets for HashMap<BodyId, T> {
    fn target_mut(&mut self, id: BodyId) -> Option<&mut dyn Damageable> {
        self.get_mut(&id).map(|t| t as &mut dyn Damageable)
    }
}
