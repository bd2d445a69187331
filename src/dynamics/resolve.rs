//! Non-splitting collision resolution: specular, random and periodic
//! velocity updates.

use rand::Rng;

use crate::common::float::Real;
use crate::common::geometry::Vec2;
use crate::obstacle::{DiskKind, Obstacle, Wall, WallKind};
use crate::particle::{Motion, Particle};

/// Keeps random outgoing directions away from grazing angles numerically
/// indistinguishable from ±π/2.
const GRAZING_GUARD: f64 = 0.95;

/// Reflect the velocity across the obstacle normal at the collision
/// point.
pub fn specular<T: Real>(p: &mut Particle<T>, o: &Obstacle<T>) {
    let n = o.normal_at(p.pos);
    p.vel = p.vel - n * (T::from_f64(2.0) * p.vel.dot(&n));
}

/// Replace the outgoing direction with a uniform draw from the cone
/// around the obstacle normal.
pub fn random_specular<T: Real, R: Rng + ?Sized>(
    p: &mut Particle<T>,
    o: &Obstacle<T>,
    rng: &mut R,
) {
    let base = o.normal_at(p.pos).angle();
    let half = T::from_f64(GRAZING_GUARD) * T::FRAC_PI_2();
    let theta = rng.gen_range(base - half..base + half);
    p.vel = Vec2::from_angle(theta);
}

/// Translate the particle by the periodic wall's normal, compensating in
/// `current_cell` so the unfolded position is untouched.
pub fn periodicity<T: Real>(p: &mut Particle<T>, w: &Wall<T>) {
    p.pos += w.normal;
    p.current_cell -= w.normal;
    if let Motion::Magnetic { center, .. } = &mut p.motion {
        *center += w.normal;
    }
}

/// Resolve a collision with obstacle `o` according to its kind. The
/// particle must already sit at the (relocated) collision point.
pub fn resolve<T: Real, R: Rng + ?Sized>(p: &mut Particle<T>, o: &Obstacle<T>, rng: &mut R) {
    match o {
        Obstacle::Wall(w) => match w.kind {
            WallKind::Periodic => periodicity(p, w),
            WallKind::Random => random_specular(p, o, rng),
            _ => specular(p, o),
        },
        Obstacle::Disk(d) => match d.kind {
            DiskKind::Random => random_specular(p, o, rng),
            _ => specular(p, o),
        },
        Obstacle::Semicircle(_) => specular(p, o),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::rng::create_rng;
    use crate::obstacle::Disk;

    #[test]
    fn test_specular_reflects_normal_component() {
        let wall: Obstacle<f64> = Obstacle::Wall(Wall::infinite(
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 0.0),
        ));
        let mut p = Particle::straight(Vec2::new(1.0, 0.5), Vec2::from_angle(0.3));
        let before = p.vel;

        specular(&mut p, &wall);

        assert!((p.vel.x + before.x).abs() < 1e-15);
        assert!((p.vel.y - before.y).abs() < 1e-15);
        assert!((p.vel.length() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_random_specular_stays_off_grazing() {
        let disk: Obstacle<f64> = Obstacle::Disk(Disk::random(Vec2::new(0.0, 0.0), 1.0));
        let mut rng = create_rng(3);
        let limit = 0.95 * std::f64::consts::FRAC_PI_2;

        for _ in 0..200 {
            let mut p = Particle::straight(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
            random_specular(&mut p, &disk, &mut rng);

            // normal at (1, 0) points along +x
            let off = p.vel.angle().abs();
            assert!(off < limit);
            assert!((p.vel.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_periodicity_preserves_unfolded_position() {
        let wall: Wall<f64> = Wall::periodic(
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 0.0),
        );
        let mut p = Particle::magnetic(Vec2::new(1.0, 0.5), Vec2::new(1.0, 0.0), 2.0);
        let unfolded = p.pos + p.current_cell;
        let center_before = p.find_cyclotron();

        periodicity(&mut p, &wall);

        let after = p.pos + p.current_cell;
        assert!((after.x - unfolded.x).abs() < 1e-15);
        assert!((after.y - unfolded.y).abs() < 1e-15);
        assert!((p.pos.x - 0.0).abs() < 1e-15);

        // cached center translated together with the position
        let Motion::Magnetic { center, .. } = p.motion else {
            unreachable!()
        };
        assert!((center.x - (center_before.x - 1.0)).abs() < 1e-15);
        assert!((center.y - center_before.y).abs() < 1e-15);
    }
}
