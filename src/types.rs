use glam::Vec2;

/// Stable caller-assigned identity of a collidable body (pack your entity id).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u64);

/// Bitmask of categorical flags carried by a body.
pub type Flags = u32;

/// Named flag bits used by the game.
pub mod flag {
    use super::Flags;

    pub const NONE: Flags = 0;
    pub const PLAYER: Flags = 1 << 0;
    pub const ENEMY: Flags = 1 << 1;
    pub const WALL: Flags = 1 << 2;
    pub const LEVEL_WALL: Flags = 1 << 3;
    pub const EXIT: Flags = 1 << 4;
    pub const DEAD: Flags = 1 << 5;
}

/// Snapshot of one collidable body for **this frame**.
///
/// Owned by the caller's object graph; the core only reads it. Positional
/// correction derived from an [`Mtv`] is applied by the caller.
#[derive(Copy, Clone, Debug)]
pub struct Body {
    pub id: BodyId,
    /// World-space center.
    pub center: Vec2,
    /// Rotation in degrees (taken modulo 360).
    pub rotation: f32,
    /// Half extents along the local X/Y axes (never negative).
    pub half_extents: Vec2,
    /// If false the box stays axis-aligned whatever `rotation` says.
    pub rotates_extents: bool,
    pub active: bool,
    pub collidable: bool,
    pub flags: Flags,
}

impl Body {
    /// Active, collidable, axis-aligned body without flags.
    pub fn new(id: BodyId, center: Vec2, half_extents: Vec2) -> Self {
        Self {
            id,
            center,
            rotation: 0.0,
            half_extents: half_extents.max(Vec2::ZERO),
            rotates_extents: false,
            active: true,
            collidable: true,
            flags: flag::NONE,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Set a rotation that is applied to the extents.
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees.rem_euclid(360.0);
        self.rotates_extents = true;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_collidable(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }

    pub fn has_flag(&self, mask: Flags) -> bool {
        self.flags & mask != 0
    }

    /// Whether the body takes part in contact tests and ray queries.
    pub fn is_solid(&self) -> bool {
        self.active && self.collidable
    }

    /// Unit forward axis; X when the extents ignore rotation.
    pub fn axis(&self) -> Vec2 {
        if self.rotates_extents {
            Vec2::from_angle(self.rotation.to_radians())
        } else {
            Vec2::X
        }
    }

    pub fn obb(&self) -> Obb {
        Obb {
            center: self.center,
            half_extents: self.half_extents.max(Vec2::ZERO),
            axis: self.axis(),
        }
    }
}

/// Oriented box: center, half extents and unit forward axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obb {
    pub center: Vec2,
    pub half_extents: Vec2,
    /// Unit local X axis; local Y is `axis.perp()`.
    pub axis: Vec2,
}

impl Obb {
    pub fn aligned(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents, axis: Vec2::X }
    }

    pub fn rotated(center: Vec2, half_extents: Vec2, degrees: f32) -> Self {
        Self { center, half_extents, axis: Vec2::from_angle(degrees.to_radians()) }
    }

    /// World point expressed in the box's local frame.
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        let rel = p - self.center;
        Vec2::new(rel.dot(self.axis), rel.dot(self.axis.perp()))
    }

    /// World direction expressed in the box's local frame.
    pub fn dir_to_local(&self, d: Vec2) -> Vec2 {
        Vec2::new(d.dot(self.axis), d.dot(self.axis.perp()))
    }
}

/// Minimum translation vector between two overlapping boxes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mtv {
    /// Unit separating axis, pointing from A toward B.
    pub axis: Vec2,
    /// Penetration depth along `axis` (≥ 0).
    pub overlap: f32,
}

impl Mtv {
    /// Translation that pushes A out of B.
    pub fn push_a(&self) -> Vec2 {
        -self.axis * self.overlap
    }

    /// Translation that pushes B out of A.
    pub fn push_b(&self) -> Vec2 {
        self.axis * self.overlap
    }
}

/// Unordered pair of bodies, canonicalized so that `a < b`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    a: BodyId,
    b: BodyId,
}

impl CollisionPair {
    pub fn new(x: BodyId, y: BodyId) -> Self {
        if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }

    pub fn a(&self) -> BodyId {
        self.a
    }

    pub fn b(&self) -> BodyId {
        self.b
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }

    /// The participant that is not `id`.
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Contact state transition discriminator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Enter,
    Stay,
    Exit,
}

/// Contact event recorded once per pair per frame.
#[derive(Copy, Clone, Debug)]
pub struct ContactEvent {
    pub kind: ContactKind,
    pub pair: CollisionPair,
    /// Present for `Enter`/`Stay`, absent for `Exit`.
    pub mtv: Option<Mtv>,
}

/// One body reported by a raycast.
#[derive(Copy, Clone, Debug)]
pub struct RayHit {
    pub id: BodyId,
    /// Distance along the ray (the ray direction is unit length).
    pub distance: f32,
    pub point: Vec2,
    pub flags: Flags,
}

/// Configuration of the per-frame collision world.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Enable internal timing instrumentation (adds small overhead when true).
    pub enable_timing: bool,
    /// Maximum number of recorded contact events per frame; extra are dropped.
    /// Listener callbacks are never dropped.
    pub max_events: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { enable_timing: false, max_events: 4096 }
    }
}

/// Navigation configuration shared by a level's planner and its agents.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct NavConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// World units per grid cell.
    pub level_scale: f32,
    /// Planner worker threads; 0 lets rayon pick.
    pub worker_threads: usize,
    /// Distance under which an agent counts a waypoint as reached.
    pub arrive_radius: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 100,
            level_scale: 1.0,
            worker_threads: 0,
            arrive_radius: 0.5,
        }
    }
}

impl NavConfig {
    /// Defaults for a level drawn at `scale` world units per cell.
    pub fn with_scale(scale: f32) -> Self {
        Self { level_scale: scale, arrive_radius: scale * 0.5, ..Self::default() }
    }
}

/// Debug statistics for the last `update`.
#[derive(Copy, Clone, Debug, Default)]
pub struct WorldStats {
    pub bodies: usize,
    /// Narrowphase tests run (n*(n-1)/2 over solid bodies).
    pub pairs_tested: usize,
    pub contacts: usize,
}

/// Timing breakdown for the last completed `update`.
#[derive(Copy, Clone, Debug, Default)]
pub struct WorldTiming {
    pub update_ms: f64,
    pub narrowphase_ms: f64,
    pub dispatch_ms: f64,

    pub events_emitted: usize,
}
