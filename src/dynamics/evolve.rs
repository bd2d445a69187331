//! Evolution driver: the bounce loop, pinned detection and the collision
//! event stream.

use log::warn;
use rand::Rng;
use rayon::prelude::*;

use crate::billiard::Billiard;
use crate::common::float::Real;
use crate::common::geometry::Vec2;
use crate::common::rng::{create_rng, derive_seed};
use crate::error::BilliardError;
use crate::particle::{Motion, Particle};

use super::raysplit::{build_ray_index, incidence_angle, resolve_raysplit, RaySplitter};
use super::relocate::{relocate, relocate_rayspl};
use super::resolve::resolve;

/// Termination target of an evolution run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvolveTarget<T: Real> {
    /// Stop after this many recorded collisions.
    Collisions(usize),
    /// Stop once the recorded flight time reaches this value.
    Time(T),
}

impl<T: Real> EvolveTarget<T> {
    fn validate(&self) -> Result<(), BilliardError> {
        match *self {
            EvolveTarget::Collisions(0) => Err(BilliardError::NonPositiveTarget { got: 0.0 }),
            EvolveTarget::Time(t) if t <= T::zero() => Err(BilliardError::NonPositiveTarget {
                got: t.to_f64().unwrap_or(f64::NAN),
            }),
            _ => Ok(()),
        }
    }

    fn reached(&self, collisions: usize, elapsed: T) -> bool {
        match *self {
            EvolveTarget::Collisions(n) => collisions >= n,
            EvolveTarget::Time(t) => elapsed >= t,
        }
    }
}

/// How an evolution run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target was reached.
    Completed,
    /// A straight particle found no obstacle ahead.
    Escaped,
    /// A magnetic particle's Larmor orbit met no non-periodic obstacle.
    Pinned,
}

/// Time-ordered collision event stream of one evolution run.
///
/// Entry 0 is the initial state at time zero; `times` holds the flight
/// time since the previous recorded event. Escape and pinning append a
/// terminal event with infinite time.
#[derive(Debug, Clone)]
pub struct EvolveResult<T: Real> {
    pub times: Vec<T>,
    /// Unfolded positions (`pos + current_cell`) per event.
    pub positions: Vec<Vec2<T>>,
    pub velocities: Vec<Vec2<T>>,
    /// Angular frequency per event; empty for straight runs.
    pub omegas: Vec<T>,
    pub outcome: Outcome,
}

impl<T: Real> EvolveResult<T> {
    /// Flight times accumulated from the start of the run.
    pub fn cumulative_times(&self) -> Vec<T> {
        let mut acc = T::zero();
        self.times
            .iter()
            .map(|&dt| {
                acc += dt;
                acc
            })
            .collect()
    }
}

/// One resolved collision step.
#[derive(Debug, Clone, Copy)]
pub struct Step<T: Real> {
    /// Collided obstacle; `None` when nothing is reachable.
    pub index: Option<usize>,
    /// Flight time of this step, relocation corrections included.
    pub dt: T,
    pub pos: Vec2<T>,
    pub vel: Vec2<T>,
}

/// Advance the particle to its next collision and resolve it. Returns
/// the step with `index: None` and infinite `dt` when no obstacle is
/// reachable (the particle is left untouched).
pub fn bounce<T: Real, R: Rng + ?Sized>(
    p: &mut Particle<T>,
    bd: &mut Billiard<T>,
    rng: &mut R,
) -> Step<T> {
    let (tmin, idx) = bd.next_collision(p);
    let Some(i) = idx else {
        return Step {
            index: None,
            dt: tmin,
            pos: p.pos,
            vel: p.vel,
        };
    };

    let tmin = relocate(p, &bd[i], tmin);
    resolve(p, &bd[i], rng);
    p.refresh_cyclotron();

    Step {
        index: Some(i),
        dt: tmin,
        pos: p.pos,
        vel: p.vel,
    }
}

/// [`bounce`] with ray splitting active: collisions with obstacles listed
/// in `raysidx` (built by
/// [`build_ray_index`](super::raysplit::build_ray_index)) go through
/// probabilistic transmission instead of ordinary resolution.
pub fn bounce_raysplit<T: Real, R: Rng + ?Sized>(
    p: &mut Particle<T>,
    bd: &mut Billiard<T>,
    raysidx: &[Option<usize>],
    splitters: &[RaySplitter<T>],
    rng: &mut R,
) -> Step<T> {
    let (tmin, idx) = bd.next_collision(p);
    let Some(i) = idx else {
        return Step {
            index: None,
            dt: tmin,
            pos: p.pos,
            vel: p.vel,
        };
    };

    let dt = match raysidx.get(i).copied().flatten() {
        Some(s) => {
            let rs = &splitters[s];
            p.propagate(tmin);

            let phi = incidence_angle(p, &bd[i]);
            let pflag = bd[i].pflag().unwrap_or(true);
            let prob = rs.transmission(phi, pflag, p.omega());
            let trans = prob > rng.gen_range(T::zero()..T::one());

            let dt_corr = relocate_rayspl(p, &bd[i], trans);
            resolve_raysplit(p, bd, i, trans, rs, phi);
            p.refresh_cyclotron();
            tmin + dt_corr
        }
        None => {
            let tmin = relocate(p, &bd[i], tmin);
            resolve(p, &bd[i], rng);
            p.refresh_cyclotron();
            tmin
        }
    };

    Step {
        index: Some(i),
        dt,
        pos: p.pos,
        vel: p.vel,
    }
}

fn evolve_core<T: Real, R: Rng + ?Sized>(
    p: &mut Particle<T>,
    bd: &mut Billiard<T>,
    target: EvolveTarget<T>,
    splitters: Option<&[RaySplitter<T>]>,
    rng: &mut R,
) -> Result<EvolveResult<T>, BilliardError> {
    target.validate()?;
    let raysidx = match splitters {
        Some(rs) => build_ray_index(rs, bd)?,
        None => Vec::new(),
    };

    let mut times = vec![T::zero()];
    let mut positions = vec![p.pos + p.current_cell];
    let mut velocities = vec![p.vel];
    let mut omegas = Vec::new();
    if p.is_magnetic() {
        omegas.push(p.omega());
    }

    let record_terminal = |p: &Particle<T>,
                               times: &mut Vec<T>,
                               positions: &mut Vec<Vec2<T>>,
                               velocities: &mut Vec<Vec2<T>>,
                               omegas: &mut Vec<T>| {
        times.push(T::infinity());
        positions.push(p.pos + p.current_cell);
        velocities.push(p.vel);
        if p.is_magnetic() {
            omegas.push(p.omega());
        }
    };

    let mut collisions = 0usize;
    let mut elapsed = T::zero();
    let mut t_acc = T::zero();

    let outcome = loop {
        if target.reached(collisions, elapsed) {
            break Outcome::Completed;
        }

        let step = match splitters {
            Some(rs) => bounce_raysplit(p, bd, &raysidx, rs, rng),
            None => bounce(p, bd, rng),
        };

        let Some(i) = step.index else {
            let outcome = if p.is_magnetic() {
                warn!("pinned particle: no reachable obstacle on the Larmor orbit");
                Outcome::Pinned
            } else {
                warn!("particle escaped: no reachable obstacle");
                Outcome::Escaped
            };
            record_terminal(p, &mut times, &mut positions, &mut velocities, &mut omegas);
            break outcome;
        };

        t_acc += step.dt;

        if bd[i].is_periodic() {
            if p.is_magnetic() && t_acc >= T::TAU() / p.omega().abs() {
                warn!("pinned particle: full Larmor period without a recorded collision");
                record_terminal(p, &mut times, &mut positions, &mut velocities, &mut omegas);
                break Outcome::Pinned;
            }
            // periodic transitions are not events; keep accumulating
            continue;
        }

        times.push(t_acc);
        positions.push(p.pos + p.current_cell);
        velocities.push(p.vel);
        if p.is_magnetic() {
            omegas.push(p.omega());
        }
        match target {
            EvolveTarget::Collisions(_) => collisions += 1,
            EvolveTarget::Time(_) => elapsed += t_acc,
        }
        t_acc = T::zero();
    };

    Ok(EvolveResult {
        times,
        positions,
        velocities,
        omegas,
        outcome,
    })
}

/// Evolve a copy of the particle through the billiard until the target is
/// reached. The billiard is taken exclusively: ray-splitting runs mutate
/// its flags in place, and `pflag` state is part of the simulation state.
///
/// A billiard whose only obstacles are periodic walls never records a
/// collision; drive such systems with [`bounce`] directly.
pub fn evolve<T: Real>(
    p: &Particle<T>,
    bd: &mut Billiard<T>,
    target: EvolveTarget<T>,
    seed: u64,
) -> Result<EvolveResult<T>, BilliardError> {
    let mut local = *p;
    evolve_mut(&mut local, bd, target, seed)
}

/// [`evolve`] mutating the particle in place.
pub fn evolve_mut<T: Real>(
    p: &mut Particle<T>,
    bd: &mut Billiard<T>,
    target: EvolveTarget<T>,
    seed: u64,
) -> Result<EvolveResult<T>, BilliardError> {
    let mut rng = create_rng(seed);
    evolve_core(p, bd, target, None, &mut rng)
}

/// Evolve with ray splitting active for the obstacles governed by
/// `splitters`.
pub fn evolve_raysplit<T: Real>(
    p: &Particle<T>,
    bd: &mut Billiard<T>,
    target: EvolveTarget<T>,
    splitters: &[RaySplitter<T>],
    seed: u64,
) -> Result<EvolveResult<T>, BilliardError> {
    let mut local = *p;
    evolve_raysplit_mut(&mut local, bd, target, splitters, seed)
}

/// [`evolve_raysplit`] mutating the particle in place.
pub fn evolve_raysplit_mut<T: Real>(
    p: &mut Particle<T>,
    bd: &mut Billiard<T>,
    target: EvolveTarget<T>,
    splitters: &[RaySplitter<T>],
    seed: u64,
) -> Result<EvolveResult<T>, BilliardError> {
    let mut rng = create_rng(seed);
    evolve_core(p, bd, target, Some(splitters), &mut rng)
}

/// True when a magnetic particle completes a full Larmor period without
/// meeting any non-periodic obstacle. Straight particles are never
/// pinned.
pub fn is_pinned<T: Real>(p: &Particle<T>, bd: &Billiard<T>) -> bool {
    let Motion::Magnetic { omega, .. } = p.motion else {
        return false;
    };
    let period = T::TAU() / omega.abs();

    let mut q = *p;
    let mut local = bd.clone();
    let mut rng = create_rng(0);
    let mut t = T::zero();
    while t < period {
        let step = bounce(&mut q, &mut local, &mut rng);
        match step.index {
            None => return true,
            Some(i) if !local[i].is_periodic() => return false,
            Some(_) => t += step.dt,
        }
    }
    true
}

/// Evolve independent particles in parallel. Each run owns a clone of
/// the billiard and a seed derived from `seed` and the particle index,
/// so results are reproducible regardless of scheduling.
pub fn evolve_ensemble<T: Real>(
    particles: &[Particle<T>],
    bd: &Billiard<T>,
    target: EvolveTarget<T>,
    seed: u64,
) -> Result<Vec<EvolveResult<T>>, BilliardError> {
    target.validate()?;
    particles
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let mut q = *p;
            let mut local = bd.clone();
            let mut rng = create_rng(derive_seed(seed, i as u64));
            evolve_core(&mut q, &mut local, target, None, &mut rng)
        })
        .collect()
}
