//! Collision times for magnetic (cyclotron) motion.
//!
//! Every solver intersects the particle's cyclotron circle with the
//! obstacle geometry and converts each intersection point into the angle
//! traversed along the circle; the collision time is that arc length.

use crate::common::float::Real;
use crate::common::geometry::Vec2;
use crate::particle::Particle;

use super::{Disk, Obstacle, Semicircle, Wall};

pub(super) fn collision_time<T: Real>(
    o: &Obstacle<T>,
    p: &Particle<T>,
    omega: T,
    center: Vec2<T>,
) -> T {
    let rc = omega.abs().recip();
    match o {
        Obstacle::Wall(w) => wall_time(w, p, omega, center, rc),
        Obstacle::Disk(d) => circle_time(d, p, omega, center, rc),
        Obstacle::Semicircle(s) => semicircle_time(s, p, omega, center, rc),
    }
}

fn wall_time<T: Real>(w: &Wall<T>, p: &Particle<T>, omega: T, pc: Vec2<T>, rc: T) -> T {
    let d = w.end - w.start;
    let sp = w.start - pc;
    let a = d.length_squared();
    let b = sp.dot(&d);
    let c = sp.length_squared() - rc * rc;
    let disc = b * b - a * c;
    if disc <= T::zero() {
        return T::infinity();
    }
    let sq = disc.sqrt();

    let mut theta_min = T::infinity();
    for u in [(-b - sq) / a, (-b + sq) / a] {
        if w.is_bounded() && !(u >= T::zero() && u <= T::one()) {
            continue;
        }
        let i = w.start + d * u;
        let theta = realangle(p, omega, pc, rc, i);
        if theta < theta_min {
            theta_min = theta;
        }
    }
    theta_min * rc
}

fn circle_time<T: Real>(d: &Disk<T>, p: &Particle<T>, omega: T, pc: Vec2<T>, rc: T) -> T {
    let mut theta_min = T::infinity();
    if let Some(points) = circle_intersections(d.center, d.radius, pc, rc) {
        for i in points {
            let theta = realangle(p, omega, pc, rc, i);
            if theta < theta_min {
                theta_min = theta;
            }
        }
    }
    theta_min * rc
}

fn semicircle_time<T: Real>(s: &Semicircle<T>, p: &Particle<T>, omega: T, pc: Vec2<T>, rc: T) -> T {
    let mut theta_min = T::infinity();
    if let Some(points) = circle_intersections(s.center, s.radius, pc, rc) {
        for i in points {
            if !s.on_arc(i) {
                continue;
            }
            let theta = realangle(p, omega, pc, rc, i);
            if theta < theta_min {
                theta_min = theta;
            }
        }
    }
    theta_min * rc
}

/// Intersection points of the obstacle circle `(c1, r1)` with the
/// cyclotron circle `(pc, rc)`; `None` when they are disjoint, nested or
/// concentric.
fn circle_intersections<T: Real>(
    c1: Vec2<T>,
    r1: T,
    pc: Vec2<T>,
    rc: T,
) -> Option<[Vec2<T>; 2]> {
    let dvec = c1 - pc;
    let d = dvec.length();
    if d >= rc + r1 || d <= (rc - r1).abs() || d == T::zero() {
        return None;
    }
    let two = T::from_f64(2.0);
    let a = (rc * rc - r1 * r1 + d * d) / (two * d);
    let h2 = rc * rc - a * a;
    let h = if h2 > T::zero() { h2.sqrt() } else { T::zero() };

    let base = pc + dvec * (a / d);
    let off = dvec.perp() * (h / d);
    Some([base + off, base - off])
}

/// Angle traversed along the cyclotron circle from the particle's current
/// position to the intersection point `i`, following the direction of
/// motion. Intersections indistinguishable from the current position are
/// counted as a full revolution (the re-hit guard).
fn realangle<T: Real>(p: &Particle<T>, omega: T, pc: Vec2<T>, rc: T, i: Vec2<T>) -> T {
    let d2 = (i - p.pos).length_squared();
    if d2 <= T::distancecheck() * T::distancecheck() {
        return T::TAU();
    }

    let two = T::from_f64(2.0);
    let cosine = (T::one() - d2 / (two * rc * rc))
        .min(T::one())
        .max(-T::one());
    let mut dphi = cosine.acos();

    // chord angle is unsigned; flip when the intersection lies behind the
    // direction of rotation
    let pr0 = p.pos - pc;
    let pr = i - pc;
    if pr0.cross(&pr) * omega.signum() < T::zero() {
        dphi = T::TAU() - dphi;
    }
    dphi
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_6, PI, TAU};

    // Counterclockwise particle on the unit circle centered at (0, 1),
    // starting at the origin moving along +x.
    fn ccw_particle() -> Particle<f64> {
        Particle::magnetic(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 1.0)
    }

    #[test]
    fn test_magnetic_wall_crossing_angle() {
        // vertical line x = 0.5 cuts the cyclotron circle; the nearer
        // crossing sits π/6 along the arc
        let w = Obstacle::Wall(Wall::infinite(
            Vec2::new(0.5, -5.0),
            Vec2::new(0.5, 5.0),
            Vec2::new(-1.0, 0.0),
        ));
        let p = ccw_particle();

        let t = w.collision_time(&p);
        assert!((t - FRAC_PI_6).abs() < 1e-12, "got {t}");
    }

    #[test]
    fn test_magnetic_wall_behind_takes_long_arc() {
        // line x = -0.5: same geometry mirrored, so the first crossing in
        // the direction of motion is 2π - π/6 - 2·(π/2 - π/6) ... simply
        // computed: the short arc lies behind, expect t > π
        let w = Obstacle::Wall(Wall::infinite(
            Vec2::new(-0.5, -5.0),
            Vec2::new(-0.5, 5.0),
            Vec2::new(1.0, 0.0),
        ));
        let p = ccw_particle();

        let t = w.collision_time(&p);
        assert!(t > PI && t < TAU);
    }

    #[test]
    fn test_magnetic_disk_tangent_and_disjoint_miss() {
        let p = ccw_particle();

        // externally tangent circle: no collision by convention
        let tangent = Obstacle::Disk(Disk::new(Vec2::new(2.0, 1.0), 1.0));
        assert!(tangent.collision_time(&p).is_infinite());

        let far = Obstacle::Disk(Disk::new(Vec2::new(5.0, 5.0), 0.5));
        assert!(far.collision_time(&p).is_infinite());
    }

    #[test]
    fn test_magnetic_disk_symmetric_hit() {
        // disk centered diametrically across the cyclotron circle from
        // the particle: first contact after a quarter turn by symmetry
        let d = Obstacle::Disk(Disk::new(Vec2::new(0.0, 2.0), 2.0_f64.sqrt() - 1.0));
        // intersections of |x|^2... sanity: the disk grazes the cyclotron
        // circle symmetrically left and right of (0, 2)
        let p = ccw_particle();
        let t = d.collision_time(&p);
        assert!(t.is_finite());
        assert!(t < TAU);
    }

    #[test]
    fn test_realangle_skips_departure_point() {
        let p = ccw_particle();
        let pc = Vec2::new(0.0, 1.0);
        // the particle's own position reads as a full revolution
        let theta = realangle(&p, 1.0, pc, 1.0, p.pos);
        assert!((theta - TAU).abs() < 1e-15);
    }

    #[test]
    fn test_clockwise_motion_reverses_arc_choice() {
        // clockwise particle: the x = 0.5 crossing now lies behind
        let p = Particle::magnetic(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), -1.0);
        let w = Obstacle::Wall(Wall::infinite(
            Vec2::new(0.5, -5.0),
            Vec2::new(0.5, 5.0),
            Vec2::new(-1.0, 0.0),
        ));

        let t = w.collision_time(&p);
        // cyclotron center is (0, -1); crossings of x = 0.5 at
        // y = -1 ± sqrt(3)/2; moving clockwise the upper one comes first,
        // π/6 along the arc by mirror symmetry
        assert!((t - FRAC_PI_6).abs() < 1e-12, "got {t}");
    }

    #[test]
    fn test_magnetic_finite_wall_segment_filter() {
        // segment too short to reach the crossing points
        let w = Obstacle::Wall(Wall::finite(
            Vec2::new(0.5, 3.0),
            Vec2::new(0.5, 5.0),
            Vec2::new(-1.0, 0.0),
        ));
        let p = ccw_particle();
        assert!(w.collision_time(&p).is_infinite());

        let reaching = Obstacle::Wall(Wall::finite(
            Vec2::new(0.5, -1.0),
            Vec2::new(0.5, 1.0),
            Vec2::new(-1.0, 0.0),
        ));
        let t = reaching.collision_time(&p);
        assert!((t - FRAC_PI_6).abs() < 1e-12);
    }

    #[test]
    fn test_magnetic_semicircle_arc_filter() {
        let p = ccw_particle();
        // full disk centered at the cyclotron center's mirror would hit;
        // restrict the arc to the far side so nothing is reachable
        let away = Obstacle::Semicircle(Semicircle::new(
            Vec2::new(0.5, 1.0),
            1.0,
            // arc opens toward the particle: every crossing filtered out
            Vec2::new(-1.0, 0.0),
        ));
        let t_away = away.collision_time(&p);
        let toward = Obstacle::Semicircle(Semicircle::new(
            Vec2::new(0.5, 1.0),
            1.0,
            Vec2::new(1.0, 0.0),
        ));
        let t_toward = toward.collision_time(&p);
        assert!(t_toward < t_away || t_away.is_infinite());
    }

    #[test]
    fn test_clockwise_quarter_turn_to_wall() {
        // clockwise from (2, 0) moving up: center (3, 0); the line x = 4
        // is reached after half a turn... use y-line through the top:
        let p = Particle::magnetic(Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0), -1.0);
        let w: Obstacle<f64> = Obstacle::Wall(Wall::infinite(
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
            Vec2::new(0.0, -1.0),
        ));
        // tangent at (3, 1): tangencies have zero discriminant and miss
        assert!(w.collision_time(&p).is_infinite());
    }
}
