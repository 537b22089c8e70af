use thiserror::Error;

use crate::grid::GridError;

/// Failures from building a planner or asking it for a path.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("a path request is already in flight for this agent")]
    Busy,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("failed to start path planner workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
