//! Billiard container: an ordered collection of obstacles with global
//! queries.

use std::ops::{Index, IndexMut};

use rand::Rng;

use crate::common::float::Real;
use crate::common::geometry::Vec2;
use crate::obstacle::Obstacle;
use crate::particle::Particle;

/// Ordered set of obstacles. Obstacle indices are stable for the lifetime
/// of a simulation; ray splitters reference them.
#[derive(Debug, Clone)]
pub struct Billiard<T: Real> {
    obstacles: Vec<Obstacle<T>>,
}

impl<T: Real> Billiard<T> {
    pub fn new(obstacles: Vec<Obstacle<T>>) -> Self {
        Self { obstacles }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn obstacles(&self) -> &[Obstacle<T>] {
        &self.obstacles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle<T>> {
        self.obstacles.iter()
    }

    /// Earliest collision of `p` over all obstacles: `(time, index)`.
    /// Ties go to the lowest index; `None` when nothing is reachable.
    /// Pure: never mutates the billiard.
    pub fn next_collision(&self, p: &Particle<T>) -> (T, Option<usize>) {
        let mut tmin = T::infinity();
        let mut idx = None;
        for (i, o) in self.obstacles.iter().enumerate() {
            let t = o.collision_time(p);
            if t < tmin {
                tmin = t;
                idx = Some(i);
            }
        }
        (tmin, idx)
    }

    /// Set every ray-splittable obstacle's propagation flag back to
    /// `true`.
    pub fn reset_flags(&mut self) {
        for o in &mut self.obstacles {
            o.set_pflag(true);
        }
    }

    /// Axis-aligned bounding box over all obstacle extents.
    pub fn bounding_box(&self) -> (Vec2<T>, Vec2<T>) {
        let mut lo = Vec2::new(T::infinity(), T::infinity());
        let mut hi = Vec2::new(T::neg_infinity(), T::neg_infinity());

        let mut grow = |p: Vec2<T>| {
            lo.x = lo.x.min(p.x);
            lo.y = lo.y.min(p.y);
            hi.x = hi.x.max(p.x);
            hi.y = hi.y.max(p.y);
        };

        for o in &self.obstacles {
            match o {
                Obstacle::Wall(w) => {
                    grow(w.start);
                    grow(w.end);
                }
                Obstacle::Disk(d) => {
                    grow(d.center + Vec2::new(d.radius, d.radius));
                    grow(d.center - Vec2::new(d.radius, d.radius));
                }
                Obstacle::Semicircle(s) => {
                    grow(s.center + Vec2::new(s.radius, s.radius));
                    grow(s.center - Vec2::new(s.radius, s.radius));
                }
            }
        }
        (lo, hi)
    }

    /// Rejection-sample a point strictly inside every obstacle's correct
    /// side. `None` after `max_tries` rejections (degenerate geometry).
    pub fn random_point_inside<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_tries: usize,
    ) -> Option<Vec2<T>> {
        let (lo, hi) = self.bounding_box();
        if !(lo.x < hi.x && lo.y < hi.y) {
            return None;
        }
        for _ in 0..max_tries {
            let p = Vec2::new(rng.gen_range(lo.x..hi.x), rng.gen_range(lo.y..hi.y));
            if self.obstacles.iter().all(|o| o.distance(p) > T::zero()) {
                return Some(p);
            }
        }
        None
    }
}

impl<T: Real> Index<usize> for Billiard<T> {
    type Output = Obstacle<T>;

    fn index(&self, i: usize) -> &Obstacle<T> {
        &self.obstacles[i]
    }
}

impl<T: Real> IndexMut<usize> for Billiard<T> {
    fn index_mut(&mut self, i: usize) -> &mut Obstacle<T> {
        &mut self.obstacles[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::rng::create_rng;
    use crate::obstacle::{Disk, Wall};

    fn unit_square() -> Billiard<f64> {
        Billiard::new(vec![
            Obstacle::Wall(Wall::infinite(
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 0.0),
            )),
            Obstacle::Wall(Wall::infinite(
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 0.0),
            )),
            Obstacle::Wall(Wall::infinite(
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
            )),
            Obstacle::Wall(Wall::infinite(
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, -1.0),
            )),
        ])
    }

    #[test]
    fn test_next_collision_picks_earliest() {
        let bd = unit_square();
        let p = Particle::straight(Vec2::new(0.2, 0.5), Vec2::new(1.0, 0.0));

        let (t, i) = bd.next_collision(&p);
        assert_eq!(i, Some(1));
        assert!((t - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_next_collision_tie_takes_lowest_index() {
        // dead center moving diagonally: all four walls equidistant in
        // time only for the two ahead; make an exact tie between two
        // disks instead
        let bd: Billiard<f64> = Billiard::new(vec![
            Obstacle::Disk(Disk::new(Vec2::new(2.0, 0.0), 1.0)),
            Obstacle::Disk(Disk::new(Vec2::new(2.0, 0.0), 1.0)),
        ]);
        let p = Particle::straight(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));

        let (t, i) = bd.next_collision(&p);
        assert_eq!(i, Some(0));
        assert!((t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_next_collision_none_when_unreachable() {
        let bd: Billiard<f64> =
            Billiard::new(vec![Obstacle::Disk(Disk::new(Vec2::new(0.0, 2.0), 0.5))]);
        let p = Particle::straight(Vec2::new(0.0, 0.0), Vec2::new(0.0, -1.0));

        let (t, i) = bd.next_collision(&p);
        assert!(t.is_infinite());
        assert_eq!(i, None);
    }

    #[test]
    fn test_reset_flags() {
        let mut bd = Billiard::new(vec![
            Obstacle::Disk(Disk::antidot(Vec2::new(0.5, 0.5), 0.2)),
            Obstacle::Disk(Disk::new(Vec2::new(0.1, 0.1), 0.05)),
        ]);
        bd[0].set_pflag(false);
        assert_eq!(bd[0].pflag(), Some(false));

        bd.reset_flags();
        assert_eq!(bd[0].pflag(), Some(true));
        assert_eq!(bd[1].pflag(), None);
    }

    #[test]
    fn test_random_point_inside_sinai() {
        let mut obstacles = unit_square().obstacles.clone();
        obstacles.push(Obstacle::Disk(Disk::new(Vec2::new(0.5, 0.5), 0.3)));
        let bd = Billiard::new(obstacles);

        let mut rng = create_rng(11);
        for _ in 0..50 {
            let p = bd.random_point_inside(&mut rng, 1000).unwrap();
            assert!(p.x > 0.0 && p.x < 1.0);
            assert!(p.y > 0.0 && p.y < 1.0);
            assert!(p.distance_to(&Vec2::new(0.5, 0.5)) > 0.3);
        }
    }
}
