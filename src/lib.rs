//! billiards_core - High-performance 2D dynamical billiards simulation kernel
//!
//! This crate advances point particles (straight-line or magnetic
//! cyclotron motion) through a set of geometric obstacles, detecting and
//! resolving collisions (specular, periodic, random, probabilistic
//! ray-splitting refraction) and emitting a time-ordered collision event
//! stream.
//!
//! The kernel is generic over the float width through the
//! [`Real`](common::float::Real) trait; all randomness flows through a
//! seedable PRNG so runs are reproducible.

pub mod billiard;
pub mod common;
pub mod dynamics;
pub mod error;
pub mod obstacle;
pub mod particle;

pub use billiard::Billiard;
pub use common::float::Real;
pub use common::geometry::Vec2;
pub use common::rng::create_rng;
pub use dynamics::evolve::{
    bounce, bounce_raysplit, evolve, evolve_ensemble, evolve_mut, evolve_raysplit,
    evolve_raysplit_mut, is_pinned, EvolveResult, EvolveTarget, Outcome, Step,
};
pub use dynamics::raysplit::{
    acceptable_raysplitter, build_ray_index, incidence_angle, is_physical, RaySplitter,
};
pub use dynamics::relocate::{relocate, relocate_rayspl};
pub use dynamics::resolve::{periodicity, random_specular, resolve, specular};
pub use error::BilliardError;
pub use obstacle::{Disk, DiskKind, Obstacle, Semicircle, Wall, WallKind};
pub use particle::{Motion, Particle};

/// Crate version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
