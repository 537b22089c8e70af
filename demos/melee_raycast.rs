use std::collections::HashMap;

use glam::Vec2;
use skirmish::*;

const ENEMY_RANGE: f32 = 85.0;
const ENEMY_DAMAGE: f32 = 15.0;

fn main() {
    tracing_subscriber::fmt().with_target(false).without_time().init();

    let mut world = CollisionWorld::new(WorldConfig::default());
    world.push(Body::new(BodyId(10), Vec2::new(40.0, 0.0), Vec2::splat(25.0)).with_flags(flag::PLAYER));
    world.push(Body::new(BodyId(11), Vec2::new(20.0, 5.0), Vec2::splat(25.0)).with_flags(flag::ENEMY | flag::DEAD));
    world.push(Body::new(BodyId(12), Vec2::new(90.0, 0.0), Vec2::new(5.0, 60.0)).with_flags(flag::WALL));

    let mut targets: HashMap<BodyId, Health> = HashMap::new();
    targets.insert(BodyId(10), Health::new(100.0));

    // Enemy at the origin swings to the right: walls stop the blade, other
    // enemies and corpses are see-through.
    let hits = world.raycast(Vec2::ZERO, 0.0, ENEMY_RANGE, flag::WALL, flag::ENEMY | flag::DEAD);
    for h in &hits {
        println!("Ray hit id={:?} t={:.3} flags={:#b}", h.id, h.distance, h.flags);
    }
    let touched = strike(&hits, ENEMY_DAMAGE, &mut targets);
    println!("touched={} player hp={:.1}", touched, targets[&BodyId(10)].current);
}
