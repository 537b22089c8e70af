//! skirmish: per-frame collision, contact events, melee raycasts and
//! off-thread grid path planning for a 2D top-down action game.

pub mod types;
pub mod error;
pub mod api;
pub mod narrowphase;
pub mod query;
pub mod world;
pub mod grid;
pub mod astar;
pub mod planner;
pub mod nav;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::grid::{Grid, GridError, GridMapping, GridRect};
pub use crate::nav::Navigator;
pub use crate::error::NavError;
pub use crate::planner::{PathHandle, PathPlanner};
pub use crate::query::{Health, raycast, strike};
pub use crate::world::CollisionWorld;
