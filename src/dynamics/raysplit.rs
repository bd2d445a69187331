//! Probabilistic ray splitting: transmission through an obstacle with
//! refraction, and the shared side-flag bookkeeping.

use std::fmt;

use crate::billiard::Billiard;
use crate::common::float::Real;
use crate::common::geometry::Vec2;
use crate::error::BilliardError;
use crate::obstacle::Obstacle;
use crate::particle::{Motion, Particle};

use super::resolve::specular;

type AngleFn<T> = Box<dyn Fn(T, bool, T) -> T + Send + Sync>;
type OmegaFn<T> = Box<dyn Fn(T, bool) -> T + Send + Sync>;

/// Ray-splitting law attached to a group of obstacles.
///
/// `oidx` lists the obstacle indices this splitter governs; `affect`
/// lists every index whose propagation flag flips on transmission and
/// must be a superset of `oidx` (it defaults to `oidx`).
pub struct RaySplitter<T: Real> {
    oidx: Vec<usize>,
    affect: Vec<usize>,
    transmission: AngleFn<T>,
    refraction: AngleFn<T>,
    new_omega: OmegaFn<T>,
}

impl<T: Real> fmt::Debug for RaySplitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaySplitter")
            .field("oidx", &self.oidx)
            .field("affect", &self.affect)
            .finish()
    }
}

impl<T: Real> RaySplitter<T> {
    /// Splitter over the obstacles at `oidx` with the given transmission
    /// probability and refraction laws `(phi, pflag, omega)`; the
    /// frequency map defaults to identity and `affect` to `oidx`.
    pub fn new(
        oidx: Vec<usize>,
        transmission: impl Fn(T, bool, T) -> T + Send + Sync + 'static,
        refraction: impl Fn(T, bool, T) -> T + Send + Sync + 'static,
    ) -> Self {
        let affect = oidx.clone();
        Self {
            oidx,
            affect,
            transmission: Box::new(transmission),
            refraction: Box::new(refraction),
            new_omega: Box::new(|omega, _| omega),
        }
    }

    /// Override the set of obstacle indices whose flags flip on
    /// transmission.
    pub fn with_affect(mut self, affect: Vec<usize>) -> Self {
        self.affect = affect;
        self
    }

    /// Override the angular-frequency map `(omega, pflag) -> omega'`
    /// applied to magnetic particles on transmission.
    pub fn with_new_omega(mut self, f: impl Fn(T, bool) -> T + Send + Sync + 'static) -> Self {
        self.new_omega = Box::new(f);
        self
    }

    pub fn oidx(&self) -> &[usize] {
        &self.oidx
    }

    pub fn affect(&self) -> &[usize] {
        &self.affect
    }

    pub fn transmission(&self, phi: T, pflag: bool, omega: T) -> T {
        (self.transmission)(phi, pflag, omega)
    }

    pub fn refraction(&self, phi: T, pflag: bool, omega: T) -> T {
        (self.refraction)(phi, pflag, omega)
    }

    pub fn new_omega(&self, omega: T, pflag: bool) -> T {
        (self.new_omega)(omega, pflag)
    }

    /// Check this splitter against a billiard: indices in range, every
    /// governed index affected, and every referenced obstacle carrying a
    /// propagation flag.
    pub fn validate(&self, bd: &Billiard<T>) -> Result<(), BilliardError> {
        for &i in &self.oidx {
            if !self.affect.contains(&i) {
                return Err(BilliardError::OidxNotInAffect {
                    oidx: self.oidx.clone(),
                    affect: self.affect.clone(),
                });
            }
        }
        for &i in &self.affect {
            if i >= bd.len() {
                return Err(BilliardError::ObstacleIndexOutOfRange {
                    index: i,
                    len: bd.len(),
                });
            }
            if bd[i].pflag().is_none() {
                return Err(BilliardError::UnsupportedObstacle {
                    index: i,
                    name: bd[i].name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Boolean form of [`RaySplitter::validate`].
pub fn acceptable_raysplitter<T: Real>(rs: &RaySplitter<T>, bd: &Billiard<T>) -> bool {
    rs.validate(bd).is_ok()
}

/// Build the obstacle-index → splitter-index lookup used by the bounce
/// loop. Fails when any splitter is invalid or two splitters govern the
/// same obstacle.
pub fn build_ray_index<T: Real>(
    splitters: &[RaySplitter<T>],
    bd: &Billiard<T>,
) -> Result<Vec<Option<usize>>, BilliardError> {
    let mut idx = vec![None; bd.len()];
    for (s, rs) in splitters.iter().enumerate() {
        rs.validate(bd)?;
        for &i in rs.oidx() {
            if idx[i].is_some() {
                return Err(BilliardError::SharedObstacle { index: i });
            }
            idx[i] = Some(s);
        }
    }
    Ok(idx)
}

/// Signed angle between the incoming velocity and the inward obstacle
/// normal, in `[-π/2, π/2]`.
pub fn incidence_angle<T: Real>(p: &Particle<T>, o: &Obstacle<T>) -> T {
    let n = o.normal_at(p.pos);
    let cosine = p.vel.dot(&(-n)).min(T::one()).max(-T::one());
    cosine.acos() * p.vel.cross(&n).signum()
}

/// Post-collision update for a ray-splittable obstacle. The particle must
/// already be relocated by [`relocate_rayspl`](super::relocate::relocate_rayspl);
/// `phi` is the incidence angle measured before relocation.
///
/// On transmission every flag in the splitter's `affect` set flips before
/// the new normal is read, so the refracted direction is measured from
/// the departure side.
pub fn resolve_raysplit<T: Real>(
    p: &mut Particle<T>,
    bd: &mut Billiard<T>,
    i: usize,
    trans: bool,
    rs: &RaySplitter<T>,
    phi: T,
) {
    if !trans {
        specular(p, &bd[i]);
        return;
    }

    let pflag = bd[i].pflag().unwrap_or(true);
    let theta = rs.refraction(phi, pflag, p.omega());

    for &j in rs.affect() {
        bd[j].flip_pflag();
    }

    let n = bd[i].normal_at(p.pos);
    p.vel = Vec2::from_angle(theta + n.angle());

    if let Motion::Magnetic { omega, .. } = &mut p.motion {
        let flipped = bd[i].pflag().unwrap_or(true);
        *omega = rs.new_omega(*omega, flipped);
    }
}

/// Sweep-based physicality check of a splitter's laws.
///
/// Always enforced: a refraction angle at or beyond π/2 must come with
/// zero transmission. Unless `only_mandatory`, additionally enforced:
/// transmission even and refraction odd in `phi` at `omega = 0`, ray
/// reversal of the refraction law, and reversal of the frequency map.
/// Non-finite refraction values count as evaluation failures, tolerated
/// iff the corresponding transmission is zero.
pub fn is_physical<T: Real>(rs: &RaySplitter<T>, only_mandatory: bool) -> bool {
    let tol = T::epsilon().sqrt();
    let half_pi = T::FRAC_PI_2();

    for pflag in [true, false] {
        for wi in 0..=20 {
            let omega = T::from_f64(wi as f64 * 0.1 - 1.0);

            if !only_mandatory {
                let twice = rs.new_omega(rs.new_omega(omega, pflag), !pflag);
                if (twice - omega).abs() > tol {
                    return false;
                }
            }

            for pi in 0..=300 {
                let phi = T::from_f64(pi as f64 * 0.01 - 1.5);

                let tr = rs.transmission(phi, pflag, omega);
                let theta = rs.refraction(phi, pflag, omega);

                if !theta.is_finite() {
                    if tr > T::zero() {
                        return false;
                    }
                    continue;
                }
                if theta >= half_pi && tr > T::zero() {
                    return false;
                }
                if only_mandatory {
                    continue;
                }

                let back = rs.refraction(theta, !pflag, omega);
                if back.is_finite() {
                    if (back - phi).abs() > tol {
                        return false;
                    }
                } else if rs.transmission(theta, !pflag, omega) > T::zero() {
                    return false;
                }

                if omega == T::zero() {
                    let tr_m = rs.transmission(-phi, pflag, omega);
                    if (tr - tr_m).abs() > tol {
                        return false;
                    }
                    let theta_m = rs.refraction(-phi, pflag, omega);
                    if theta_m.is_finite() {
                        if (theta + theta_m).abs() > tol {
                            return false;
                        }
                    } else if tr_m > T::zero() {
                        return false;
                    }
                }
            }
        }
    }
    true
}
