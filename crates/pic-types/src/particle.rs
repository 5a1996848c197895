// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Particles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Macro-particles and read-only particle collections.
//!
//! Deposition only needs position, velocity, charge and weight, so it
//! works against [`ParticleView`] and [`ParticleCollection`]. A
//! collection may hand out a lightweight proxy instead of a copy, as
//! [`ParticleArray`] does for its struct-of-arrays storage.

use crate::constants::ELECTRON_CHARGE;

/// Read access to the state a deposition needs.
pub trait ParticleView {
    fn position(&self) -> [f64; 3];
    fn velocity(&self) -> [f64; 3];
    fn charge(&self) -> f64;
    /// Number of physical particles represented by this macro-particle.
    fn weight(&self) -> f64;
}

impl<T: ParticleView + ?Sized> ParticleView for &T {
    fn position(&self) -> [f64; 3] {
        (**self).position()
    }
    fn velocity(&self) -> [f64; 3] {
        (**self).velocity()
    }
    fn charge(&self) -> f64 {
        (**self).charge()
    }
    fn weight(&self) -> f64 {
        (**self).weight()
    }
}

/// Charged macro-particle state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub charge: f64,
    pub weight: f64,
}

impl Particle {
    /// Electron macro-particle of unit weight.
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        Particle {
            position,
            velocity,
            charge: ELECTRON_CHARGE,
            weight: 1.0,
        }
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl ParticleView for Particle {
    fn position(&self) -> [f64; 3] {
        self.position
    }
    fn velocity(&self) -> [f64; 3] {
        self.velocity
    }
    fn charge(&self) -> f64 {
        self.charge
    }
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Indexed read-only access to a set of particles.
///
/// `Sync` so that bulk deposition can hand indices to rayon workers.
pub trait ParticleCollection: Sync {
    type Proxy<'a>: ParticleView
    where
        Self: 'a;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Panics if `index >= len()`.
    fn get(&self, index: usize) -> Self::Proxy<'_>;
}

impl ParticleCollection for [Particle] {
    type Proxy<'a> = &'a Particle;

    fn len(&self) -> usize {
        <[Particle]>::len(self)
    }

    fn get(&self, index: usize) -> &Particle {
        &self[index]
    }
}

impl ParticleCollection for Vec<Particle> {
    type Proxy<'a> = &'a Particle;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> &Particle {
        &self[index]
    }
}

/// Struct-of-arrays particle storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleArray {
    positions: Vec<[f64; 3]>,
    velocities: Vec<[f64; 3]>,
    charges: Vec<f64>,
    weights: Vec<f64>,
}

impl ParticleArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ParticleArray {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            charges: Vec::with_capacity(capacity),
            weights: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, particle: impl ParticleView) {
        self.positions.push(particle.position());
        self.velocities.push(particle.velocity());
        self.charges.push(particle.charge());
        self.weights.push(particle.weight());
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.charges.clear();
        self.weights.clear();
    }

    pub fn proxy(&self, index: usize) -> ParticleProxy<'_> {
        assert!(
            index < self.len(),
            "particle index {index} out of range for array of {}",
            self.len()
        );
        ParticleProxy { array: self, index }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = ParticleProxy<'_>> + '_ {
        (0..self.len()).map(move |index| ParticleProxy { array: self, index })
    }

    /// Copy particle `index` out of the array.
    pub fn to_particle(&self, index: usize) -> Particle {
        Particle {
            position: self.positions[index],
            velocity: self.velocities[index],
            charge: self.charges[index],
            weight: self.weights[index],
        }
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn velocities(&self) -> &[[f64; 3]] {
        &self.velocities
    }
}

impl FromIterator<Particle> for ParticleArray {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        let mut array = ParticleArray::new();
        for particle in iter {
            array.push(particle);
        }
        array
    }
}

/// Borrowed handle to one particle of a [`ParticleArray`].
#[derive(Debug, Clone, Copy)]
pub struct ParticleProxy<'a> {
    array: &'a ParticleArray,
    index: usize,
}

impl ParticleProxy<'_> {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl ParticleView for ParticleProxy<'_> {
    fn position(&self) -> [f64; 3] {
        self.array.positions[self.index]
    }
    fn velocity(&self) -> [f64; 3] {
        self.array.velocities[self.index]
    }
    fn charge(&self) -> f64 {
        self.array.charges[self.index]
    }
    fn weight(&self) -> f64 {
        self.array.weights[self.index]
    }
}

impl ParticleCollection for ParticleArray {
    type Proxy<'a> = ParticleProxy<'a>;

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn get(&self, index: usize) -> ParticleProxy<'_> {
        self.proxy(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_particle_is_unit_weight_electron() {
        let p = Particle::new([1.0, 2.0, 3.0], [15.0, 7.0, 10.0]);
        assert_eq!(p.charge(), ELECTRON_CHARGE);
        assert_eq!(p.weight(), 1.0);
        assert_eq!(p.velocity(), [15.0, 7.0, 10.0]);
    }

    #[test]
    fn test_particle_array_proxy_matches_pushed_state() {
        let particles = vec![
            Particle::new([0.1, 0.2, 0.3], [1.0, 0.0, 0.0]),
            Particle::new([0.4, 0.5, 0.6], [0.0, 2.0, 0.0])
                .with_charge(2.0)
                .with_weight(5.0),
        ];
        let array: ParticleArray = particles.iter().copied().collect();
        assert_eq!(ParticleCollection::len(&array), 2);

        let proxy = array.get(1);
        assert_eq!(proxy.index(), 1);
        assert_eq!(proxy.position(), [0.4, 0.5, 0.6]);
        assert_eq!(proxy.velocity(), [0.0, 2.0, 0.0]);
        assert_eq!(proxy.charge(), 2.0);
        assert_eq!(proxy.weight(), 5.0);
        assert_eq!(array.to_particle(1), particles[1]);
    }

    #[test]
    fn test_slice_and_vec_collections_agree() {
        let particles = vec![Particle::new([0.0; 3], [1.0; 3]); 3];
        let slice: &[Particle] = &particles;
        assert_eq!(ParticleCollection::len(slice), 3);
        assert_eq!(ParticleCollection::len(&particles), 3);
        assert_eq!(ParticleCollection::get(slice, 2).velocity(), [1.0; 3]);
    }

    #[test]
    #[should_panic]
    fn test_proxy_out_of_range_panics() {
        let array = ParticleArray::new();
        let _ = array.proxy(0);
    }

    #[test]
    fn test_clear_empties_all_columns() {
        let mut array = ParticleArray::with_capacity(4);
        array.push(Particle::new([0.0; 3], [0.0; 3]));
        assert!(!array.is_empty());
        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.iter().count(), 0);
    }
}
