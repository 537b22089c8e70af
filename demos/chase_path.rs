use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use skirmish::nav::turn_towards;
use skirmish::*;

fn main() -> Result<(), NavError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .without_time()
        .init();

    let cfg = NavConfig { grid_width: 40, grid_height: 40, ..NavConfig::with_scale(16.0) };
    let rects = [GridRect::new(12, 0, 2, 30), GridRect::new(26, 10, 2, 30)];
    let grid = Arc::new(Grid::from_rects(cfg.grid_width, cfg.grid_height, &rects)?);
    let planner = PathPlanner::new(grid, &cfg)?;

    let mut agent = Navigator::new(cfg.arrive_radius);
    let mut pos = Vec2::new(-280.0, -280.0);
    let mut heading = 0.0f32;
    let target = Vec2::new(280.0, -280.0);
    let (speed, dt) = (200.0f32, 1.0f32 / 30.0);

    agent.request(&planner, pos, target)?;
    for frame in 0..2000 {
        if agent.poll() {
            println!("frame {frame}: new path with {} waypoints", agent.path().len());
        }
        let Some(next) = agent.next_waypoint(pos) else {
            if agent.is_idle() {
                println!("frame {frame}: arrived at ({:.1},{:.1})", pos.x, pos.y);
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
            continue;
        };
        let dir = (next - pos).normalize_or_zero();
        pos += dir * (speed * dt).min(pos.distance(next));
        heading = turn_towards(heading, dir.to_angle().to_degrees(), 720.0 * dt);
    }
    println!("final heading {:.1}°", heading);
    Ok(())
}
