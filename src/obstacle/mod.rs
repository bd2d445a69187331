//! Obstacle catalog: the geometric primitives a billiard boundary is
//! built from, with per-kind collision-time solvers.

mod magnetic;
mod straight;

use crate::common::float::Real;
use crate::common::geometry::Vec2;
use crate::particle::{Motion, Particle};

/// Wall behavior on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    /// Specular reflection; the solver treats the wall as an infinite
    /// line.
    Infinite,
    /// Specular reflection restricted to the segment. `door` marks the
    /// wall as an escape boundary for downstream escape analysis.
    Finite { door: bool },
    /// Teleports the particle by the wall's normal vector.
    Periodic,
    /// Reflects into a uniformly random outgoing direction.
    Random,
    /// Ray-splittable wall; `pflag` records which side the particle is
    /// currently on.
    Splitter { pflag: bool },
}

/// Straight wall segment from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall<T: Real> {
    pub start: Vec2<T>,
    pub end: Vec2<T>,
    /// Points into the billiard interior (toward the pflag-true side for
    /// splitter walls). Unit length, except for periodic walls where the
    /// magnitude equals the cell translation.
    pub normal: Vec2<T>,
    pub kind: WallKind,
    pub name: String,
}

impl<T: Real> Wall<T> {
    fn build(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>, kind: WallKind, name: &str) -> Self {
        let normal = match kind {
            WallKind::Periodic => normal,
            _ => normal.normalize(),
        };
        Self {
            start,
            end,
            normal,
            kind,
            name: name.to_string(),
        }
    }

    pub fn infinite(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>) -> Self {
        Self::build(start, end, normal, WallKind::Infinite, "Infinite wall")
    }

    pub fn finite(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>) -> Self {
        Self::build(
            start,
            end,
            normal,
            WallKind::Finite { door: false },
            "Finite wall",
        )
    }

    /// Finite wall marking an escape boundary.
    pub fn door(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>) -> Self {
        Self::build(start, end, normal, WallKind::Finite { door: true }, "Door")
    }

    /// The normal's magnitude is the translation applied on collision.
    pub fn periodic(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>) -> Self {
        Self::build(start, end, normal, WallKind::Periodic, "Periodic wall")
    }

    pub fn random(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>) -> Self {
        Self::build(start, end, normal, WallKind::Random, "Random wall")
    }

    /// Ray-splittable wall; the flag starts on the `normal` side.
    pub fn splitter(start: Vec2<T>, end: Vec2<T>, normal: Vec2<T>) -> Self {
        Self::build(
            start,
            end,
            normal,
            WallKind::Splitter { pflag: true },
            "Splitter wall",
        )
    }

    /// Unit normal oriented toward the particle's current side.
    pub fn oriented_normal(&self) -> Vec2<T> {
        let n = self.normal.normalize();
        match self.kind {
            WallKind::Splitter { pflag: false } => -n,
            _ => n,
        }
    }

    /// Whether the collision solver must restrict hits to the segment.
    fn is_bounded(&self) -> bool {
        matches!(self.kind, WallKind::Finite { .. } | WallKind::Splitter { .. })
    }

    fn within_segment(&self, point: Vec2<T>) -> bool {
        let d = self.end - self.start;
        let u = (point - self.start).dot(&d);
        u >= T::zero() && u <= d.length_squared()
    }
}

/// Disk behavior on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskKind {
    /// Specular reflection.
    Solid,
    /// Reflects into a uniformly random outgoing direction.
    Random,
    /// Ray-splittable disk; `pflag == true` while the particle is
    /// outside.
    Antidot { pflag: bool },
}

/// Circular obstacle.
#[derive(Debug, Clone, PartialEq)]
pub struct Disk<T: Real> {
    pub center: Vec2<T>,
    pub radius: T,
    pub kind: DiskKind,
    pub name: String,
}

impl<T: Real> Disk<T> {
    pub fn new(center: Vec2<T>, radius: T) -> Self {
        Self {
            center,
            radius,
            kind: DiskKind::Solid,
            name: "Disk".to_string(),
        }
    }

    pub fn random(center: Vec2<T>, radius: T) -> Self {
        Self {
            center,
            radius,
            kind: DiskKind::Random,
            name: "Random disk".to_string(),
        }
    }

    /// Ray-splittable disk; the flag starts with the particle outside.
    pub fn antidot(center: Vec2<T>, radius: T) -> Self {
        Self {
            center,
            radius,
            kind: DiskKind::Antidot { pflag: true },
            name: "Antidot".to_string(),
        }
    }
}

/// Half-circle arc; `facedir` points out of the open (flat) face, so the
/// arc lies on the opposite side.
#[derive(Debug, Clone, PartialEq)]
pub struct Semicircle<T: Real> {
    pub center: Vec2<T>,
    pub radius: T,
    pub facedir: Vec2<T>,
    pub name: String,
}

impl<T: Real> Semicircle<T> {
    pub fn new(center: Vec2<T>, radius: T, facedir: Vec2<T>) -> Self {
        Self {
            center,
            radius,
            facedir: facedir.normalize(),
            name: "Semicircle".to_string(),
        }
    }

    pub(crate) fn on_arc(&self, point: Vec2<T>) -> bool {
        (point - self.center).dot(&self.facedir) < T::zero()
    }
}

/// A geometric obstacle of the billiard, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Obstacle<T: Real> {
    Wall(Wall<T>),
    Disk(Disk<T>),
    Semicircle(Semicircle<T>),
}

impl<T: Real> Obstacle<T> {
    pub fn name(&self) -> &str {
        match self {
            Obstacle::Wall(w) => &w.name,
            Obstacle::Disk(d) => &d.name,
            Obstacle::Semicircle(s) => &s.name,
        }
    }

    /// Rename the obstacle, builder style.
    pub fn named(mut self, name: &str) -> Self {
        match &mut self {
            Obstacle::Wall(w) => w.name = name.to_string(),
            Obstacle::Disk(d) => d.name = name.to_string(),
            Obstacle::Semicircle(s) => s.name = name.to_string(),
        }
        self
    }

    pub fn is_periodic(&self) -> bool {
        matches!(
            self,
            Obstacle::Wall(Wall {
                kind: WallKind::Periodic,
                ..
            })
        )
    }

    pub fn is_door(&self) -> bool {
        matches!(
            self,
            Obstacle::Wall(Wall {
                kind: WallKind::Finite { door: true },
                ..
            })
        )
    }

    /// Propagation flag of ray-splittable obstacles; `None` for every
    /// other kind.
    pub fn pflag(&self) -> Option<bool> {
        match self {
            Obstacle::Wall(Wall {
                kind: WallKind::Splitter { pflag },
                ..
            }) => Some(*pflag),
            Obstacle::Disk(Disk {
                kind: DiskKind::Antidot { pflag },
                ..
            }) => Some(*pflag),
            _ => None,
        }
    }

    /// Set the propagation flag; no-op for obstacles without one.
    pub fn set_pflag(&mut self, value: bool) {
        match self {
            Obstacle::Wall(Wall {
                kind: WallKind::Splitter { pflag },
                ..
            }) => *pflag = value,
            Obstacle::Disk(Disk {
                kind: DiskKind::Antidot { pflag },
                ..
            }) => *pflag = value,
            _ => {}
        }
    }

    pub fn flip_pflag(&mut self) {
        if let Some(flag) = self.pflag() {
            self.set_pflag(!flag);
        }
    }

    /// Unit normal at `pos`, pointing toward the side where the flag is
    /// true (into the billiard interior for ordinary obstacles).
    pub fn normal_at(&self, pos: Vec2<T>) -> Vec2<T> {
        match self {
            Obstacle::Wall(w) => w.oriented_normal(),
            Obstacle::Disk(d) => {
                let n = (pos - d.center).normalize();
                match d.kind {
                    DiskKind::Antidot { pflag: false } => -n,
                    _ => n,
                }
            }
            Obstacle::Semicircle(s) => (s.center - pos).normalize(),
        }
    }

    /// Signed distance from `pos` to the obstacle boundary: positive on
    /// the correct side. For periodic walls positive means "not yet
    /// crossed".
    pub fn distance(&self, pos: Vec2<T>) -> T {
        match self {
            Obstacle::Wall(w) => {
                let d = (pos - w.start).dot(&w.normal.normalize());
                match w.kind {
                    WallKind::Splitter { pflag: false } => -d,
                    _ => d,
                }
            }
            Obstacle::Disk(d) => {
                let dist = pos.distance_to(&d.center) - d.radius;
                match d.kind {
                    DiskKind::Antidot { pflag: false } => -dist,
                    _ => dist,
                }
            }
            Obstacle::Semicircle(s) => s.radius - pos.distance_to(&s.center),
        }
    }

    /// Time until the particle's trajectory next meets this obstacle, or
    /// `+∞` when it never does.
    pub fn collision_time(&self, p: &Particle<T>) -> T {
        match p.motion {
            Motion::Straight => straight::collision_time(self, p),
            Motion::Magnetic { omega, center } => magnetic::collision_time(self, p, omega, center),
        }
    }
}
