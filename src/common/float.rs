//! Float-width parameterization of the numeric core.

use std::fmt::{Debug, Display};
use std::ops::{AddAssign, MulAssign, SubAssign};

use num_traits::float::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;

/// Floating-point scalar the kernel is generic over.
///
/// Collision detection and relocation depend on precision constants that
/// scale with the machine epsilon of the float width in use; `f32` and
/// `f64` are provided. An extended-precision implementation should
/// override [`Real::timeprec`] and [`Real::timeprec_forward`] with a fixed
/// `1e-12` instead of deriving them from the epsilon.
pub trait Real:
    Float
    + FloatConst
    + SampleUniform
    + AddAssign
    + SubAssign
    + MulAssign
    + Debug
    + Display
    + Send
    + Sync
    + 'static
{
    /// Cast a literal into this width.
    fn from_f64(x: f64) -> Self;

    /// Relocation time step for standard obstacles.
    fn timeprec() -> Self {
        Self::epsilon().powf(Self::from_f64(0.8))
    }

    /// Coarser relocation step for magnetic motion through periodic walls,
    /// where near-tangential incidence amplifies position error.
    fn timeprec_forward() -> Self {
        Self::epsilon().powf(Self::from_f64(0.75))
    }

    /// Minimum positional separation for a cyclotron intersection to count
    /// as a new collision rather than a re-hit of the departure point.
    fn distancecheck() -> Self {
        Self::epsilon().sqrt()
    }
}

impl Real for f32 {
    fn from_f64(x: f64) -> Self {
        x as f32
    }
}

impl Real for f64 {
    fn from_f64(x: f64) -> Self {
        x
    }
}
