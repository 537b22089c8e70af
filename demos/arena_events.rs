use glam::Vec2;
use skirmish::narrowphase::slide_correction;
use skirmish::*;

const WALL_FRICTION: f32 = 0.3;

/// Pushes the player out of walls on every Stay, like the game does.
struct Arena {
    player: BodyId,
    player_pos: Vec2,
    player_vel: Vec2,
    dt: f32,
}

impl ContactListener for Arena {
    fn on_collision_enter(&mut self, body: BodyId, other: BodyId, _mtv: Mtv) {
        println!("  enter: {:?} touches {:?}", body, other);
    }

    fn on_collision_stay(&mut self, body: BodyId, other: BodyId, mtv: Mtv) {
        if body == self.player {
            let delta = slide_correction(mtv, self.player_vel, WALL_FRICTION, self.dt);
            self.player_pos += delta;
            println!("  stay: {:?} vs {:?} depth={:.3} -> corrected by ({:.2},{:.2})", body, other, mtv.overlap, delta.x, delta.y);
        }
    }

    fn on_collision_exit(&mut self, body: BodyId, other: BodyId) {
        println!("  exit: {:?} leaves {:?}", body, other);
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).without_time().init();

    let mut world = CollisionWorld::new(WorldConfig { enable_timing: true, ..WorldConfig::default() });
    let player = BodyId(1);
    let wall = Body::new(BodyId(2), Vec2::new(3.0, 0.0), Vec2::new(0.5, 4.0)).with_flags(flag::WALL);
    let pillar = Body::new(BodyId(3), Vec2::new(0.0, 3.0), Vec2::splat(0.75))
        .with_rotation(45.0)
        .with_flags(flag::WALL);

    let mut arena = Arena { player, player_pos: Vec2::ZERO, player_vel: Vec2::new(4.0, 1.5), dt: 1.0 / 10.0 };

    for frame in 1..=12 {
        arena.player_pos += arena.player_vel * arena.dt;
        let body = Body::new(player, arena.player_pos, Vec2::splat(0.5)).with_flags(flag::PLAYER);
        world.set_bodies(vec![body, wall, pillar]);

        println!("frame {frame}: player at ({:.2},{:.2})", arena.player_pos.x, arena.player_pos.y);
        world.update(&mut arena);
        if let Some(t) = world.timing() {
            println!(
                "  timing: update={:.3}ms narrow={:.3}ms dispatch={:.3}ms events={}",
                t.update_ms, t.narrowphase_ms, t.dispatch_ms, t.events_emitted
            );
        }
        if frame == 8 {
            // Turn around and leave the wall
            arena.player_vel = Vec2::new(-6.0, 0.0);
        }
    }
}
