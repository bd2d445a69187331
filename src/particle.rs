//! Moving point particles: straight-line and magnetic (cyclotron) motion.

use crate::common::float::Real;
use crate::common::geometry::Vec2;

/// Motion law of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion<T: Real> {
    /// Straight-line propagation.
    Straight,
    /// Circular propagation with signed angular frequency `omega`;
    /// `center` caches the cyclotron center derived from the current
    /// position and velocity.
    Magnetic { omega: T, center: Vec2<T> },
}

/// State of a moving point particle.
///
/// The velocity is kept at unit length; speed never enters the dynamics.
/// `current_cell` accumulates the periodic-cell translations, so that
/// `pos + current_cell` is the unfolded position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle<T: Real> {
    pub pos: Vec2<T>,
    pub vel: Vec2<T>,
    pub current_cell: Vec2<T>,
    pub motion: Motion<T>,
}

impl<T: Real> Particle<T> {
    /// Straight particle at `pos` moving along `vel` (normalized).
    pub fn straight(pos: Vec2<T>, vel: Vec2<T>) -> Self {
        Self {
            pos,
            vel: vel.normalize(),
            current_cell: Vec2::zero(),
            motion: Motion::Straight,
        }
    }

    /// Straight particle at `pos` moving at angle `phi` from the x axis.
    pub fn from_angle(pos: Vec2<T>, phi: T) -> Self {
        Self::straight(pos, Vec2::from_angle(phi))
    }

    /// Magnetic particle with signed cyclotron frequency `omega`
    /// (cyclotron radius `1/|omega|`).
    pub fn magnetic(pos: Vec2<T>, vel: Vec2<T>, omega: T) -> Self {
        let vel = vel.normalize();
        Self {
            pos,
            vel,
            current_cell: Vec2::zero(),
            motion: Motion::Magnetic {
                omega,
                center: cyclotron_center(pos, vel, omega),
            },
        }
    }

    pub fn is_magnetic(&self) -> bool {
        matches!(self.motion, Motion::Magnetic { .. })
    }

    /// Angular frequency; zero for straight motion.
    pub fn omega(&self) -> T {
        match self.motion {
            Motion::Straight => T::zero(),
            Motion::Magnetic { omega, .. } => omega,
        }
    }

    pub fn angle_of_velocity(&self) -> T {
        self.vel.angle()
    }

    /// Cyclotron center derived from the current position and velocity
    /// (ignores the cache). Returns the position itself for straight
    /// motion.
    pub fn find_cyclotron(&self) -> Vec2<T> {
        match self.motion {
            Motion::Straight => self.pos,
            Motion::Magnetic { omega, .. } => cyclotron_center(self.pos, self.vel, omega),
        }
    }

    /// Refresh the cached cyclotron center. Must be called after any
    /// mutation of `pos`, `vel` or `omega` outside of [`Self::propagate`].
    pub fn refresh_cyclotron(&mut self) {
        if let Motion::Magnetic { omega, center } = &mut self.motion {
            *center = cyclotron_center(self.pos, self.vel, *omega);
        }
    }

    /// Advance the particle by time `dt` along its trajectory.
    ///
    /// Magnetic propagation keeps the cyclotron center fixed; only
    /// collisions move it.
    pub fn propagate(&mut self, dt: T) {
        match self.motion {
            Motion::Straight => self.pos += self.vel * dt,
            Motion::Magnetic { omega, .. } => {
                let phi0 = self.vel.angle();
                let phi = omega * dt + phi0;
                let (s, c) = phi.sin_cos();
                let (s0, c0) = phi0.sin_cos();
                self.pos += Vec2::new((s - s0) / omega, (-c + c0) / omega);
                self.vel = Vec2::new(c, s);
            }
        }
    }

    /// The position the particle would reach after time `dt`, without
    /// mutating it.
    pub fn propagate_pos(&self, dt: T) -> Vec2<T> {
        match self.motion {
            Motion::Straight => self.pos + self.vel * dt,
            Motion::Magnetic { omega, .. } => {
                let phi0 = self.vel.angle();
                let phi = omega * dt + phi0;
                let (s, c) = phi.sin_cos();
                let (s0, c0) = phi0.sin_cos();
                self.pos + Vec2::new((s - s0) / omega, (-c + c0) / omega)
            }
        }
    }

    /// Fast commit path when the destination is already computed: place
    /// the particle at `pos` and rotate the velocity as if it had
    /// propagated for `dt`.
    pub fn propagate_to(&mut self, pos: Vec2<T>, dt: T) {
        self.pos = pos;
        if let Motion::Magnetic { omega, .. } = self.motion {
            let phi = omega * dt + self.vel.angle();
            let (s, c) = phi.sin_cos();
            self.vel = Vec2::new(c, s);
        }
    }
}

fn cyclotron_center<T: Real>(pos: Vec2<T>, vel: Vec2<T>, omega: T) -> Vec2<T> {
    pos + vel.perp() / omega
}
