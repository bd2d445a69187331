//! Corrective relocation: nudge the propagation time until the particle
//! sits on the geometrically correct side of the collided obstacle.

use log::warn;

use crate::common::float::Real;
use crate::obstacle::Obstacle;
use crate::particle::Particle;

/// Escalation bound; the geometric ×10 growth makes more iterations
/// pointless.
const MAX_ESCALATIONS: usize = 20;

/// Relocation time step for this particle/obstacle pairing. Magnetic
/// motion through a periodic wall is the shallow-angle worst case and
/// gets the coarser constant.
pub(crate) fn timeprec<T: Real>(p: &Particle<T>, o: &Obstacle<T>) -> T {
    if p.is_magnetic() && o.is_periodic() {
        T::timeprec_forward()
    } else {
        T::timeprec()
    }
}

/// Propagate `p` by `tmin`, correcting the time so the particle ends up
/// just outside a standard obstacle, or just past a periodic wall.
/// Returns the corrected propagation time.
pub fn relocate<T: Real>(p: &mut Particle<T>, o: &Obstacle<T>, mut tmin: T) -> T {
    let sig = if o.is_periodic() { T::one() } else { -T::one() };
    let prec = timeprec(p, o);

    let mut newpos = p.propagate_pos(tmin);
    let mut step = T::one();
    let mut n = 0;
    while o.distance(newpos) * sig > T::zero() {
        tmin += sig * step * prec;
        newpos = p.propagate_pos(tmin);
        step *= T::from_f64(10.0);
        n += 1;
        if n >= MAX_ESCALATIONS {
            warn!(
                "relocation onto {:?} did not converge within {} escalations",
                o.name(),
                MAX_ESCALATIONS
            );
            break;
        }
    }
    p.propagate_to(newpos, tmin);
    tmin
}

/// Ray-splitting relocation. The particle has already been propagated to
/// the collision point; push it through the obstacle when `trans` is
/// true, pull it back outside otherwise. Returns the applied time
/// correction.
pub fn relocate_rayspl<T: Real>(p: &mut Particle<T>, o: &Obstacle<T>, trans: bool) -> T {
    let ineq = if trans { T::one() } else { -T::one() };
    let prec = timeprec(p, o);

    let mut dt = T::zero();
    let mut newpos = p.pos;
    let mut step = T::one();
    let mut n = 0;
    while o.distance(newpos) * ineq > T::zero() {
        dt += ineq * step * prec;
        newpos = p.propagate_pos(dt);
        step *= T::from_f64(10.0);
        n += 1;
        if n >= MAX_ESCALATIONS {
            warn!(
                "ray-splitting relocation onto {:?} did not converge within {} escalations",
                o.name(),
                MAX_ESCALATIONS
            );
            break;
        }
    }
    p.propagate_to(newpos, dt);
    dt
}
