use glam::Vec2;

use std::collections::HashSet;
use std::time::Instant;

use crate::api::{ContactListener, NarrowphaseApi};
use crate::narrowphase::Narrowphase;
use crate::query;
use crate::types::*;

/// Per-frame collision world: a body snapshot plus the contact state
/// carried from one `update` to the next.
pub struct CollisionWorld {
    pub cfg: WorldConfig,
    pub frame_counter: u32,

    // Frame snapshot supplied by the caller
    bodies: Vec<Body>,

    // Contacts found by the last update, in discovery order, and their lookup set
    contacts: Vec<(CollisionPair, Mtv)>,
    contact_set: HashSet<CollisionPair>,

    // Event buffer for this frame
    events: Vec<ContactEvent>,

    last_stats: WorldStats,
    last_timing: Option<WorldTiming>,
}

impl CollisionWorld {
    pub fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            frame_counter: 0,
            bodies: Vec::new(),
            contacts: Vec::new(),
            contact_set: HashSet::new(),
            events: Vec::new(),
            last_stats: WorldStats::default(),
            last_timing: None,
        }
    }

    /// Replace the body snapshot for the coming `update`.
    pub fn set_bodies(&mut self, bodies: Vec<Body>) {
        debug_assert!(
            {
                let mut ids: Vec<BodyId> = bodies.iter().map(|b| b.id).collect();
                ids.sort_unstable();
                ids.windows(2).all(|w| w[0] != w[1])
            },
            "Duplicate BodyId encountered within a frame"
        );
        self.bodies = bodies;
    }

    /// Append one body to the current snapshot.
    pub fn push(&mut self, body: Body) {
        debug_assert!(self.body(body.id).is_none(), "Duplicate BodyId encountered within a frame");
        self.bodies.push(body);
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Run the contact pass: test every pair of solid bodies, then report
    /// Enter/Stay for current contacts and Exit for contacts that ended.
    pub fn update(&mut self, listener: &mut impl ContactListener) {
        let t_all = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        self.events.clear();
        self.frame_counter = self.frame_counter.wrapping_add(1);

        // Narrowphase over all unordered pairs
        let solid: Vec<(BodyId, Obb)> = self
            .bodies
            .iter()
            .filter(|b| b.is_solid())
            .map(|b| (b.id, b.obb()))
            .collect();
        let mut current: Vec<(CollisionPair, Mtv)> = Vec::new();
        let mut pairs_tested = 0usize;
        for i in 0..solid.len() {
            for j in (i + 1)..solid.len() {
                pairs_tested += 1;
                let (ia, a) = &solid[i];
                let (ib, b) = &solid[j];
                // Orient the MTV from the lower id toward the higher one
                let pair = CollisionPair::new(*ia, *ib);
                let mtv = if pair.a() == *ia {
                    Narrowphase::obb_mtv(a, b)
                } else {
                    Narrowphase::obb_mtv(b, a)
                };
                if let Some(mtv) = mtv {
                    current.push((pair, mtv));
                }
            }
        }
        let narrowphase_ms = t_all.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        // Dispatch
        let t_dispatch = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        let current_set: HashSet<CollisionPair> = current.iter().map(|(p, _)| *p).collect();
        for &(pair, mtv) in &current {
            let flipped = Mtv { axis: -mtv.axis, overlap: mtv.overlap };
            if self.contact_set.contains(&pair) {
                listener.on_collision_stay(pair.a(), pair.b(), mtv);
                listener.on_collision_stay(pair.b(), pair.a(), flipped);
                self.record(ContactKind::Stay, pair, Some(mtv));
            } else {
                listener.on_collision_enter(pair.a(), pair.b(), mtv);
                listener.on_collision_enter(pair.b(), pair.a(), flipped);
                self.record(ContactKind::Enter, pair, Some(mtv));
            }
        }
        let previous = std::mem::take(&mut self.contacts);
        for (pair, _) in previous {
            if !current_set.contains(&pair) {
                listener.on_collision_exit(pair.a(), pair.b());
                listener.on_collision_exit(pair.b(), pair.a());
                self.record(ContactKind::Exit, pair, None);
            }
        }

        self.contacts = current;
        self.contact_set = current_set;
        self.last_stats = WorldStats {
            bodies: self.bodies.len(),
            pairs_tested,
            contacts: self.contacts.len(),
        };
        tracing::trace!(
            frame = self.frame_counter,
            bodies = self.last_stats.bodies,
            contacts = self.last_stats.contacts,
            events = self.events.len(),
            "contact pass"
        );

        self.last_timing = t_all.map(|t| WorldTiming {
            update_ms: t.elapsed().as_secs_f64() * 1000.0,
            narrowphase_ms,
            dispatch_ms: t_dispatch.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0),
            events_emitted: self.events.len(),
        });
    }

    fn record(&mut self, kind: ContactKind, pair: CollisionPair, mtv: Option<Mtv>) {
        if self.events.len() < self.cfg.max_events {
            self.events.push(ContactEvent { kind, pair, mtv });
        }
    }

    /// Drain and return the events recorded by the last `update`.
    pub fn drain_events(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pairs in contact as of the last `update`, with their MTV (lower id → higher id).
    pub fn contacts(&self) -> impl Iterator<Item = (CollisionPair, Mtv)> + '_ {
        self.contacts.iter().copied()
    }

    pub fn is_touching(&self, a: BodyId, b: BodyId) -> bool {
        self.contact_set.contains(&CollisionPair::new(a, b))
    }

    /// Forget tracked contacts without reporting exits (level change).
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
        self.contact_set.clear();
        self.events.clear();
    }

    // --- Queries -----------------------------------------------------------

    /// Raycast against the current snapshot; see [`query::raycast`].
    pub fn raycast(
        &self,
        origin: Vec2,
        angle: f32,
        max_distance: f32,
        stop_mask: Flags,
        ignore_mask: Flags,
    ) -> Vec<RayHit> {
        query::raycast(origin, angle, max_distance, &self.bodies, stop_mask, ignore_mask)
    }

    pub fn query_point(&self, p: Vec2, mask: Flags) -> Vec<BodyId> {
        query::query_point(p, &self.bodies, mask)
    }

    pub fn query_obb(&self, probe: &Obb, mask: Flags) -> Vec<BodyId> {
        query::query_obb(probe, &self.bodies, mask)
    }

    /// MTV between two solid bodies of the current snapshot, oriented from `a` to `b`.
    pub fn mtv_between(&self, a: BodyId, b: BodyId) -> Option<Mtv> {
        let a = self.body(a).filter(|b| b.is_solid())?;
        let b = self.body(b).filter(|b| b.is_solid())?;
        Narrowphase::obb_mtv(&a.obb(), &b.obb())
    }

    /// Return debug stats for the last `update`.
    pub fn stats(&self) -> WorldStats {
        self.last_stats
    }

    /// Return timing breakdown for the last `update` run.
    pub fn timing(&self) -> Option<WorldTiming> {
        self.last_timing
    }
}
