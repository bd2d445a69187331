//! Collision times for straight-line motion.

use crate::common::float::Real;
use crate::particle::Particle;

use super::{Disk, DiskKind, Obstacle, Semicircle, Wall};

pub(super) fn collision_time<T: Real>(o: &Obstacle<T>, p: &Particle<T>) -> T {
    match o {
        Obstacle::Wall(w) => wall_time(w, p),
        Obstacle::Disk(d) => disk_time(d, p),
        Obstacle::Semicircle(s) => semicircle_time(s, p),
    }
}

fn wall_time<T: Real>(w: &Wall<T>, p: &Particle<T>) -> T {
    let n = w.oriented_normal();
    let denom = p.vel.dot(&n);
    if denom >= T::zero() {
        // not approaching the wall plane
        return T::infinity();
    }
    let t = (w.start - p.pos).dot(&n) / denom;
    if t <= T::zero() {
        return T::infinity();
    }
    if w.is_bounded() && !w.within_segment(p.pos + p.vel * t) {
        return T::infinity();
    }
    t
}

fn disk_time<T: Real>(d: &Disk<T>, p: &Particle<T>) -> T {
    let dc = p.pos - d.center;
    let b = p.vel.dot(&dc);
    let c = dc.length_squared() - d.radius * d.radius;
    let disc = b * b - c;
    if disc <= T::zero() {
        return T::infinity();
    }
    let sq = disc.sqrt();

    let t = if matches!(d.kind, DiskKind::Antidot { pflag: false }) {
        // inside the antidot: take the exit intersection
        -b + sq
    } else {
        if b >= T::zero() {
            // receding from the disk center
            return T::infinity();
        }
        -b - sq
    };

    if t <= T::zero() {
        T::infinity()
    } else {
        t
    }
}

fn semicircle_time<T: Real>(s: &Semicircle<T>, p: &Particle<T>) -> T {
    let dc = p.pos - s.center;
    let b = p.vel.dot(&dc);
    let c = dc.length_squared() - s.radius * s.radius;
    let disc = b * b - c;
    if disc <= T::zero() {
        return T::infinity();
    }
    let sq = disc.sqrt();

    // nearer intersection first; only hits on the arc half count
    for t in [-b - sq, -b + sq] {
        if t <= T::zero() {
            continue;
        }
        if s.on_arc(p.pos + p.vel * t) {
            return t;
        }
    }
    T::infinity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::geometry::Vec2;

    #[test]
    fn test_infinite_wall_head_on() {
        let w: Wall<f64> =
            Wall::infinite(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 0.0));
        let p = Particle::straight(Vec2::new(0.5, 0.5), Vec2::new(1.0, 0.0));

        let t = wall_time(&w, &p);
        assert!((t - 0.5).abs() < 1e-15);

        // moving away never collides
        let q = Particle::straight(Vec2::new(0.5, 0.5), Vec2::new(-1.0, 0.0));
        assert!(wall_time(&w, &q).is_infinite());
    }

    #[test]
    fn test_finite_wall_respects_segment() {
        let w: Wall<f64> =
            Wall::finite(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 0.0));

        let hit = Particle::straight(Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.0));
        assert!((wall_time(&w, &hit) - 1.0).abs() < 1e-15);

        let miss = Particle::straight(Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0));
        assert!(wall_time(&w, &miss).is_infinite());
    }

    #[test]
    fn test_disk_approach() {
        let d: Disk<f64> = Disk::new(Vec2::new(0.0, 0.0), 1.0);
        let p = Particle::straight(Vec2::new(-3.0, 0.0), Vec2::new(1.0, 0.0));

        let t = disk_time(&d, &p);
        assert!((t - 2.0).abs() < 1e-12);

        let grazing_miss = Particle::straight(Vec2::new(-3.0, 1.5), Vec2::new(1.0, 0.0));
        assert!(disk_time(&d, &grazing_miss).is_infinite());
    }

    #[test]
    fn test_antidot_inside_exits() {
        let mut d: Disk<f64> = Disk::antidot(Vec2::new(0.0, 0.0), 1.0);
        d.kind = DiskKind::Antidot { pflag: false };
        let p = Particle::straight(Vec2::new(-0.5, 0.0), Vec2::new(1.0, 0.0));

        let t = disk_time(&d, &p);
        assert!((t - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_semicircle_only_arc_side_hits() {
        // arc on the upper half, open face down
        let s: Semicircle<f64> = Semicircle::new(Vec2::new(0.0, 0.0), 1.0, Vec2::new(0.0, -1.0));

        let up = Particle::straight(Vec2::new(0.0, -0.5), Vec2::new(0.0, 1.0));
        let t = semicircle_time(&s, &up);
        assert!((t - 1.5).abs() < 1e-12);

        let down = Particle::straight(Vec2::new(0.0, -0.5), Vec2::new(0.0, -1.0));
        assert!(semicircle_time(&s, &down).is_infinite());
    }
}
