//! Particle-in-cell numerical core.
//!
//! Current deposition from particles onto a staggered grid, and
//! real ↔ complex transforms of grid fields for spectral solvers.

pub mod deposition;
pub mod fourier;

pub use pic_math::fft::{Direction, BACKEND_COMPILED};

/// Whether spectral transforms do real work in this build.
pub fn spectral_transforms_available() -> bool {
    BACKEND_COMPILED
}
