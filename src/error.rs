//! Error types for argument validation.

use thiserror::Error;

/// Errors raised by the evolution entry points and ray-splitter setup.
///
/// Pinned and escaping trajectories are not errors; they terminate an
/// evolution cleanly with a terminal event (see
/// [`Outcome`](crate::dynamics::evolve::Outcome)).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BilliardError {
    /// `evolve` needs a positive time or a non-zero collision count.
    #[error("evolution target must be positive, got {got}")]
    NonPositiveTarget { got: f64 },

    /// A ray splitter references an obstacle index the billiard does not
    /// have.
    #[error("obstacle index {index} out of range for a billiard of {len} obstacles")]
    ObstacleIndexOutOfRange { index: usize, len: usize },

    /// A ray splitter's governed indices must all be listed among the
    /// affected indices.
    #[error("governed obstacle indices {oidx:?} are not a subset of affected indices {affect:?}")]
    OidxNotInAffect { oidx: Vec<usize>, affect: Vec<usize> },

    /// Two ray splitters attached to the same billiard govern the same
    /// obstacle.
    #[error("obstacle {index} is governed by more than one ray splitter")]
    SharedObstacle { index: usize },

    /// A ray splitter references an obstacle without a propagation flag.
    #[error("obstacle {index} ({name}) does not carry a propagation flag")]
    UnsupportedObstacle { index: usize, name: String },
}
