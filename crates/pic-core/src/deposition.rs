// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Current Deposition
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Particle → grid current deposition.
//!
//! Each particle contributes `q * w * v / V_cell` to Jx, Jy, Jz, spread
//! over the stencil of a [`ShapeFunction`] anchored on the staggered
//! sub-grid of that component. Three schemes are provided:
//!
//! | scheme        | shape     | nodes | position used       |
//! |---------------|-----------|-------|---------------------|
//! | first order   | linear    | 8     | current             |
//! | CIC           | linear    | 8     | retarded by `dt/2`  |
//! | TSC           | quadratic | 27    | retarded by `dt/2`  |
//!
//! Bulk deposition runs particles on the rayon pool. Jx, Jy and Jz each
//! sit behind their own lock, so a worker scattering into Jx never waits
//! on one scattering into Jz.

use ndarray::Array3;
use parking_lot::Mutex;
use pic_math::form_factor::{LinearShape, QuadraticShape, ShapeFunction};
use pic_types::config::{DepositionConfig, DepositionScheme};
use pic_types::error::{PicError, PicResult};
use pic_types::grid::{Coordinate, GridGeometry, InterpolationOrder, YeeGrid};
use pic_types::particle::{ParticleCollection, ParticleView};
use rayon::prelude::*;
use std::marker::PhantomData;

/// Whether the current arrays are cleared before depositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zeroize {
    /// Accumulate on top of the existing current.
    #[default]
    Keep,
    /// Zero Jx, Jy, Jz first.
    Clear,
}

/// One particle's contribution to one current component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentContribution<S> {
    pub anchor: [isize; 3],
    pub weights: S,
    /// Current density carried by the particle before spreading.
    pub current: f64,
}

impl<S: ShapeFunction> ComponentContribution<S> {
    /// Add `weight * current` to every stencil node of `field`.
    ///
    /// Panics if the stencil leaves the array; the grid's guard layer
    /// must cover the support of `S`.
    pub fn scatter(&self, field: &mut Array3<f64>) {
        let [ax, ay, az] = self.anchor;
        let current = self.current;
        self.weights.for_each_node(|[di, dj, dk], w| {
            let idx = [
                (ax + di) as usize,
                (ay + dj) as usize,
                (az + dk) as usize,
            ];
            field[idx] += w * current;
        });
    }
}

/// Current deposition with shape function `S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentDeposition<S> {
    /// How far back along the velocity the contributing position is taken.
    half_step: f64,
    _shape: PhantomData<S>,
}

pub type FirstOrderCurrentDeposition = CurrentDeposition<LinearShape>;
pub type CurrentDepositionCic = CurrentDeposition<LinearShape>;
pub type CurrentDepositionTsc = CurrentDeposition<QuadraticShape>;

fn validate_time_step(dt: f64) -> PicResult<f64> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(PicError::PhysicsViolation(format!(
            "deposition time step must be finite and >= 0, got {dt}"
        )));
    }
    Ok(dt)
}

impl CurrentDeposition<LinearShape> {
    /// Linear weights at the particle's current position.
    pub fn first_order() -> Self {
        CurrentDeposition {
            half_step: 0.0,
            _shape: PhantomData,
        }
    }

    /// Linear weights at the position half a step back in time.
    pub fn cic(dt: f64) -> PicResult<Self> {
        Self::time_centred(dt)
    }
}

impl CurrentDeposition<QuadraticShape> {
    /// Quadratic weights at the position half a step back in time.
    pub fn tsc(dt: f64) -> PicResult<Self> {
        Self::time_centred(dt)
    }
}

impl<S: ShapeFunction> CurrentDeposition<S> {
    pub fn time_centred(dt: f64) -> PicResult<Self> {
        let dt = validate_time_step(dt)?;
        Ok(CurrentDeposition {
            half_step: 0.5 * dt,
            _shape: PhantomData,
        })
    }

    pub fn order(&self) -> InterpolationOrder {
        S::ORDER
    }

    pub fn half_step(&self) -> f64 {
        self.half_step
    }

    /// Position at which the current is evaluated.
    pub fn deposition_position(&self, particle: &impl ParticleView) -> [f64; 3] {
        let p = particle.position();
        let v = particle.velocity();
        [
            p[0] - v[0] * self.half_step,
            p[1] - v[1] * self.half_step,
            p[2] - v[2] * self.half_step,
        ]
    }

    /// Per-component contributions of one particle, indexed x, y, z.
    pub fn contribution(
        &self,
        geometry: &GridGeometry,
        particle: &impl ParticleView,
    ) -> [ComponentContribution<S>; 3] {
        let position = self.deposition_position(particle);
        let v = particle.velocity();
        let scale = particle.charge() * particle.weight() / geometry.cell_volume();

        Coordinate::ALL.map(|coord| {
            let anchor = geometry.current_index(coord, position, S::ORDER);
            ComponentContribution {
                anchor: anchor.index,
                weights: S::compute(anchor.offset),
                current: v[coord.index()] * scale,
            }
        })
    }

    /// Deposit one particle on top of the existing current.
    pub fn deposit(&self, grid: &mut YeeGrid, particle: &impl ParticleView) {
        self.deposit_with(grid, particle, Zeroize::Keep);
    }

    pub fn deposit_with(&self, grid: &mut YeeGrid, particle: &impl ParticleView, zeroize: Zeroize) {
        if zeroize == Zeroize::Clear {
            grid.zeroize_current();
        }
        let (geometry, currents) = grid.current_mut();
        let contributions = self.contribution(geometry, particle);
        for (field, contribution) in currents.into_iter().zip(contributions.iter()) {
            contribution.scatter(field);
        }
    }

    /// Clear the current, then deposit every particle in parallel.
    pub fn deposit_many<P>(&self, grid: &mut YeeGrid, particles: &P)
    where
        P: ParticleCollection + ?Sized,
    {
        self.deposit_many_with(grid, particles, Zeroize::Clear);
    }

    pub fn deposit_many_with<P>(&self, grid: &mut YeeGrid, particles: &P, zeroize: Zeroize)
    where
        P: ParticleCollection + ?Sized,
    {
        if zeroize == Zeroize::Clear {
            grid.zeroize_current();
        }
        tracing::debug!(
            particles = particles.len(),
            order = ?S::ORDER,
            half_step = self.half_step,
            "depositing current"
        );

        let (geometry, [jx, jy, jz]) = grid.current_mut();
        let locks = [Mutex::new(jx), Mutex::new(jy), Mutex::new(jz)];

        (0..particles.len()).into_par_iter().for_each(|i| {
            let particle = particles.get(i);
            let contributions = self.contribution(geometry, &particle);
            for (lock, contribution) in locks.iter().zip(contributions.iter()) {
                let mut field = lock.lock();
                contribution.scatter(&mut field);
            }
        });
    }
}

/// Deposition scheme chosen at runtime, e.g. from a config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyCurrentDeposition {
    FirstOrder(FirstOrderCurrentDeposition),
    Cic(CurrentDepositionCic),
    Tsc(CurrentDepositionTsc),
}

impl AnyCurrentDeposition {
    pub fn new(scheme: DepositionScheme, dt: f64) -> PicResult<Self> {
        Ok(match scheme {
            DepositionScheme::FirstOrder => {
                validate_time_step(dt)?;
                AnyCurrentDeposition::FirstOrder(CurrentDeposition::first_order())
            }
            DepositionScheme::Cic => AnyCurrentDeposition::Cic(CurrentDeposition::cic(dt)?),
            DepositionScheme::Tsc => AnyCurrentDeposition::Tsc(CurrentDeposition::tsc(dt)?),
        })
    }

    pub fn from_config(config: &DepositionConfig) -> PicResult<Self> {
        Self::new(config.scheme, config.time_step)
    }

    pub fn scheme(&self) -> DepositionScheme {
        match self {
            AnyCurrentDeposition::FirstOrder(_) => DepositionScheme::FirstOrder,
            AnyCurrentDeposition::Cic(_) => DepositionScheme::Cic,
            AnyCurrentDeposition::Tsc(_) => DepositionScheme::Tsc,
        }
    }

    pub fn order(&self) -> InterpolationOrder {
        self.scheme().order()
    }

    pub fn deposit_with(&self, grid: &mut YeeGrid, particle: &impl ParticleView, zeroize: Zeroize) {
        match self {
            AnyCurrentDeposition::FirstOrder(d) => d.deposit_with(grid, particle, zeroize),
            AnyCurrentDeposition::Cic(d) => d.deposit_with(grid, particle, zeroize),
            AnyCurrentDeposition::Tsc(d) => d.deposit_with(grid, particle, zeroize),
        }
    }

    pub fn deposit(&self, grid: &mut YeeGrid, particle: &impl ParticleView) {
        self.deposit_with(grid, particle, Zeroize::Keep);
    }

    pub fn deposit_many_with<P>(&self, grid: &mut YeeGrid, particles: &P, zeroize: Zeroize)
    where
        P: ParticleCollection + ?Sized,
    {
        match self {
            AnyCurrentDeposition::FirstOrder(d) => d.deposit_many_with(grid, particles, zeroize),
            AnyCurrentDeposition::Cic(d) => d.deposit_many_with(grid, particles, zeroize),
            AnyCurrentDeposition::Tsc(d) => d.deposit_many_with(grid, particles, zeroize),
        }
    }

    pub fn deposit_many<P>(&self, grid: &mut YeeGrid, particles: &P)
    where
        P: ParticleCollection + ?Sized,
    {
        self.deposit_many_with(grid, particles, Zeroize::Clear);
    }
}
