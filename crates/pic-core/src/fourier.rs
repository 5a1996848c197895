// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Fourier Transforms
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Real ↔ complex transforms of grid field components.
//!
//! A [`ScalarFieldTransform`] is bound once to a real array, a complex
//! array and a logical size; later calls must pass arrays of the bound
//! shapes. [`FieldTransformSet`] holds one transform per (field, axis).

use ndarray::{s, Array3};
use num_complex::Complex64;
use pic_math::fft::{create_backend, create_backends, Direction, TransformBackend};
use pic_types::config::TransformBackendKind;
use pic_types::error::{PicError, PicResult};
use pic_types::grid::{Coordinate, Field, YeeGrid};
use pic_types::spectral::{complex_extent, SpectralGrid};
use rayon::prelude::*;

/// Arrays and size a transform was initialized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformBinding {
    /// Logical transform size (nx, ny, nz).
    pub size: [usize; 3],
    /// First real-array index covered by the transform.
    pub origin: [usize; 3],
    pub real_shape: [usize; 3],
    pub real_len: usize,
    pub complex_shape: [usize; 3],
}

impl TransformBinding {
    fn check(&self, real: &Array3<f64>, complex: &Array3<Complex64>) -> PicResult<()> {
        if shape3(real) != self.real_shape || real.len() != self.real_len {
            return Err(PicError::ShapeMismatch {
                what: "real array".to_string(),
                expected: self.real_shape.to_vec(),
                found: real.shape().to_vec(),
            });
        }
        if shape3(complex) != self.complex_shape {
            return Err(PicError::ShapeMismatch {
                what: "complex array".to_string(),
                expected: self.complex_shape.to_vec(),
                found: complex.shape().to_vec(),
            });
        }
        Ok(())
    }

    fn norm(&self) -> f64 {
        (self.size[0] * self.size[1] * self.size[2]) as f64
    }
}

fn shape3<T>(a: &Array3<T>) -> [usize; 3] {
    let (x, y, z) = a.dim();
    [x, y, z]
}

/// Transform between one real array and its spectral counterpart.
pub struct ScalarFieldTransform {
    backend: Box<dyn TransformBackend>,
    binding: Option<TransformBinding>,
}

impl ScalarFieldTransform {
    pub fn new(kind: TransformBackendKind) -> Self {
        Self::with_backend(create_backend(kind))
    }

    pub fn with_backend(backend: Box<dyn TransformBackend>) -> Self {
        ScalarFieldTransform {
            backend,
            binding: None,
        }
    }

    /// False when transforms are no-ops.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn binding(&self) -> Option<&TransformBinding> {
        self.binding.as_ref()
    }

    /// Bind arrays whose shape equals the logical size.
    pub fn initialize(
        &mut self,
        real: &Array3<f64>,
        complex: &Array3<Complex64>,
        size: [usize; 3],
    ) -> PicResult<()> {
        self.initialize_at(real, complex, size, [0; 3])
    }

    /// Bind the block `origin .. origin + size` of `real` to `complex`.
    ///
    /// Any previous binding and its plans are released first.
    pub fn initialize_at(
        &mut self,
        real: &Array3<f64>,
        complex: &Array3<Complex64>,
        size: [usize; 3],
        origin: [usize; 3],
    ) -> PicResult<()> {
        self.teardown();

        if size.iter().any(|&n| n == 0) {
            return Err(PicError::InvalidGrid(format!(
                "transform size must be >= 1 on every axis, got {size:?}"
            )));
        }
        let real_shape = shape3(real);
        for a in 0..3 {
            if origin[a] + size[a] > real_shape[a] {
                return Err(PicError::ShapeMismatch {
                    what: format!("real block at {origin:?} of size {size:?}"),
                    expected: size.iter().zip(&origin).map(|(n, o)| n + o).collect(),
                    found: real_shape.to_vec(),
                });
            }
        }
        let complex_shape = complex_extent(size);
        if shape3(complex) != complex_shape {
            return Err(PicError::ShapeMismatch {
                what: "complex array".to_string(),
                expected: complex_shape.to_vec(),
                found: complex.shape().to_vec(),
            });
        }

        self.backend.plan(size);
        self.binding = Some(TransformBinding {
            size,
            origin,
            real_shape,
            real_len: real.len(),
            complex_shape,
        });
        Ok(())
    }

    fn bound(&self, real: &Array3<f64>, complex: &Array3<Complex64>) -> PicResult<TransformBinding> {
        let binding = self
            .binding
            .ok_or_else(|| PicError::TransformUnbound("call initialize first".to_string()))?;
        binding.check(real, complex)?;
        Ok(binding)
    }

    /// Real → complex, unnormalized.
    pub fn forward(&self, real: &Array3<f64>, complex: &mut Array3<Complex64>) -> PicResult<()> {
        let b = self.bound(real, complex)?;
        let [ox, oy, oz] = b.origin;
        let [nx, ny, nz] = b.size;
        let block = real.slice(s![ox..ox + nx, oy..oy + ny, oz..oz + nz]);
        self.backend.forward(block, complex.view_mut());
        Ok(())
    }

    /// Complex → real, divided by nx*ny*nz so that a forward/inverse
    /// pair reproduces the input. Only the bound block is written.
    pub fn inverse(&self, complex: &Array3<Complex64>, real: &mut Array3<f64>) -> PicResult<()> {
        let b = self.bound(real, complex)?;
        if !self.backend.is_available() {
            return Ok(());
        }
        let [ox, oy, oz] = b.origin;
        let [nx, ny, nz] = b.size;
        let mut block = real.slice_mut(s![ox..ox + nx, oy..oy + ny, oz..oz + nz]);
        self.backend.inverse(complex.view(), block.view_mut());
        let norm = b.norm();
        block.par_mapv_inplace(|v| v / norm);
        Ok(())
    }

    pub fn transform(
        &self,
        direction: Direction,
        real: &mut Array3<f64>,
        complex: &mut Array3<Complex64>,
    ) -> PicResult<()> {
        match direction {
            Direction::RealToComplex => self.forward(real, complex),
            Direction::ComplexToReal => self.inverse(complex, real),
        }
    }

    /// Drop the binding and cached plans. No-op when unbound.
    pub fn teardown(&mut self) {
        if self.binding.take().is_some() {
            self.backend.teardown();
        }
    }
}

impl Drop for ScalarFieldTransform {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Slot of (field, coordinate) in the transform table.
fn slot(field: Field, coord: Coordinate) -> usize {
    field.index() * Coordinate::ALL.len() + coord.index()
}

/// One transform per (E, B, J) × (x, y, z) component.
pub struct FieldTransformSet {
    transforms: [ScalarFieldTransform; 9],
}

impl FieldTransformSet {
    pub fn new(kind: TransformBackendKind) -> Self {
        FieldTransformSet {
            transforms: create_backends::<9>(kind).map(ScalarFieldTransform::with_backend),
        }
    }

    pub fn is_available(&self) -> bool {
        self.transforms.iter().all(|t| t.is_available())
    }

    /// True when every component is bound.
    pub fn is_bound(&self) -> bool {
        self.transforms.iter().all(|t| t.binding().is_some())
    }

    pub fn get(&self, field: Field, coord: Coordinate) -> &ScalarFieldTransform {
        &self.transforms[slot(field, coord)]
    }

    /// Bind every real component of `grid` (interior cells) to the
    /// matching array of `spectral`.
    pub fn initialize(&mut self, grid: &YeeGrid, spectral: &SpectralGrid) -> PicResult<()> {
        let size = grid.num_internal_cells();
        if spectral.size != size {
            return Err(PicError::ShapeMismatch {
                what: "spectral grid logical size".to_string(),
                expected: size.to_vec(),
                found: spectral.size.to_vec(),
            });
        }
        let origin = grid.geometry.interior_origin();
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                let bound = self.transforms[slot(field, coord)].initialize_at(
                    grid.field(field, coord),
                    spectral.field(field, coord),
                    size,
                    origin,
                );
                if let Err(err) = bound {
                    // all nine or none
                    self.teardown();
                    return Err(err);
                }
            }
        }
        tracing::debug!(
            ?size,
            ?origin,
            backend = self.transforms[0].backend_name(),
            "initialized field transforms"
        );
        Ok(())
    }

    pub fn transform(
        &self,
        field: Field,
        coord: Coordinate,
        direction: Direction,
        grid: &mut YeeGrid,
        spectral: &mut SpectralGrid,
    ) -> PicResult<()> {
        let t = self.get(field, coord);
        match direction {
            Direction::RealToComplex => {
                t.forward(grid.field(field, coord), spectral.field_mut(field, coord))
            }
            Direction::ComplexToReal => {
                t.inverse(spectral.field(field, coord), grid.field_mut(field, coord))
            }
        }
    }

    pub fn forward(
        &self,
        field: Field,
        coord: Coordinate,
        grid: &YeeGrid,
        spectral: &mut SpectralGrid,
    ) -> PicResult<()> {
        self.get(field, coord)
            .forward(grid.field(field, coord), spectral.field_mut(field, coord))
    }

    pub fn inverse(
        &self,
        field: Field,
        coord: Coordinate,
        spectral: &SpectralGrid,
        grid: &mut YeeGrid,
    ) -> PicResult<()> {
        self.get(field, coord)
            .inverse(spectral.field(field, coord), grid.field_mut(field, coord))
    }

    /// Transform all nine components in `direction`, one rayon task per
    /// component.
    pub fn transform_all(
        &self,
        direction: Direction,
        grid: &mut YeeGrid,
        spectral: &mut SpectralGrid,
    ) -> PicResult<()> {
        self.transforms
            .par_iter()
            .zip(grid.components_mut())
            .zip(spectral.components_mut())
            .try_for_each(|((t, real), complex)| match direction {
                Direction::RealToComplex => t.forward(real, complex),
                Direction::ComplexToReal => t.inverse(complex, real),
            })
    }

    pub fn teardown(&mut self) {
        for t in self.transforms.iter_mut() {
            t.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pic_math::fft::NullBackend;

    fn filled(size: [usize; 3]) -> Array3<f64> {
        Array3::from_shape_fn((size[0], size[1], size[2]), |(i, j, k)| {
            (0.3 * i as f64).sin() + (0.7 * j as f64).cos() * (k as f64 + 1.0)
        })
    }

    fn empty_spectrum(size: [usize; 3]) -> Array3<Complex64> {
        let [a, b, c] = complex_extent(size);
        Array3::from_elem((a, b, c), Complex64::new(0.0, 0.0))
    }

    #[test]
    fn test_forward_before_initialize_is_an_error() {
        let t = ScalarFieldTransform::new(TransformBackendKind::Disabled);
        let real = filled([2, 2, 2]);
        let mut complex = empty_spectrum([2, 2, 2]);
        let err = t.forward(&real, &mut complex).unwrap_err();
        assert!(matches!(err, PicError::TransformUnbound(_)));
    }

    #[test]
    fn test_initialize_rejects_wrong_complex_shape() {
        let mut t = ScalarFieldTransform::new(TransformBackendKind::Disabled);
        let real = filled([4, 4, 4]);
        // complex_extent([4, 4, 4]) is [4, 4, 3]
        let complex = empty_spectrum([4, 4, 6]);
        assert!(t.initialize(&real, &complex, [4, 4, 4]).is_err());
        let uncompacted = Array3::from_elem((4, 4, 4), Complex64::new(0.0, 0.0));
        assert!(t.initialize(&real, &uncompacted, [4, 4, 4]).is_err());
        assert!(t.binding().is_none());
    }

    #[test]
    fn test_initialize_rejects_block_outside_real_array() {
        let mut t = ScalarFieldTransform::new(TransformBackendKind::Disabled);
        let real = filled([6, 6, 6]);
        let complex = empty_spectrum([4, 4, 4]);
        assert!(t.initialize_at(&real, &complex, [4, 4, 4], [1, 1, 1]).is_ok());
        assert!(t.initialize_at(&real, &complex, [4, 4, 4], [3, 1, 1]).is_err());
    }

    #[test]
    fn test_calls_with_other_shapes_are_rejected() {
        let mut t = ScalarFieldTransform::new(TransformBackendKind::Disabled);
        let real = filled([4, 4, 4]);
        let complex = empty_spectrum([4, 4, 4]);
        t.initialize(&real, &complex, [4, 4, 4]).unwrap();
        let other = filled([4, 4, 5]);
        let mut complex = complex;
        let err = t.forward(&other, &mut complex).unwrap_err();
        assert!(matches!(err, PicError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut t = ScalarFieldTransform::with_backend(Box::new(NullBackend));
        t.teardown();
        let real = filled([2, 3, 4]);
        let complex = empty_spectrum([2, 3, 4]);
        t.initialize(&real, &complex, [2, 3, 4]).unwrap();
        assert_eq!(t.binding().map(|b| b.real_len), Some(24));
        t.teardown();
        t.teardown();
        assert!(t.binding().is_none());
    }

    #[test]
    fn test_disabled_backend_leaves_arrays_unchanged() {
        let mut t = ScalarFieldTransform::new(TransformBackendKind::Disabled);
        assert!(!t.is_available());
        let mut real = filled([3, 3, 4]);
        let mut complex = empty_spectrum([3, 3, 4]);
        complex.fill(Complex64::new(2.0, -1.0));
        t.initialize(&real, &complex, [3, 3, 4]).unwrap();

        let real_before = real.clone();
        let complex_before = complex.clone();
        t.transform(Direction::RealToComplex, &mut real, &mut complex).unwrap();
        t.transform(Direction::ComplexToReal, &mut real, &mut complex).unwrap();
        assert_eq!(real, real_before);
        assert_eq!(complex, complex_before);
    }

    #[cfg(feature = "fft")]
    #[test]
    fn test_roundtrip_restores_interior_and_keeps_guards() {
        let mut t = ScalarFieldTransform::new(TransformBackendKind::RustFft);
        let size = [4, 3, 6];
        let mut real = filled([8, 7, 10]);
        let mut complex = empty_spectrum(size);
        t.initialize_at(&real, &complex, size, [2, 2, 2]).unwrap();

        let original = real.clone();
        t.forward(&real, &mut complex).unwrap();
        real.slice_mut(s![2..6, 2..5, 2..8]).fill(0.0);
        t.inverse(&complex, &mut real).unwrap();
        for (idx, &v) in real.indexed_iter() {
            assert!(
                (v - original[idx]).abs() < 1e-10,
                "node {idx:?}: {v} vs {}",
                original[idx]
            );
        }
    }

    #[cfg(feature = "fft")]
    #[test]
    fn test_field_set_roundtrip_all_components() {
        let mut grid = YeeGrid::new([6, 5, 8], [0.0; 3], [0.1, 0.2, 0.1]).unwrap();
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                let shift = (slot(field, coord) + 1) as f64;
                grid.field_mut(field, coord)
                    .indexed_iter_mut()
                    .for_each(|((i, j, k), v)| *v = shift * ((i + 2 * j + 3 * k) as f64 * 0.1).sin());
            }
        }
        let original = grid.clone();
        let mut spectral = SpectralGrid::for_grid(&grid).unwrap();
        let mut set = FieldTransformSet::new(TransformBackendKind::RustFft);
        assert!(set.is_available());
        set.initialize(&grid, &spectral).unwrap();

        set.transform_all(Direction::RealToComplex, &mut grid, &mut spectral)
            .unwrap();
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                grid.field_mut(field, coord).fill(0.0);
            }
        }
        set.transform_all(Direction::ComplexToReal, &mut grid, &mut spectral)
            .unwrap();

        let [gx, gy, gz] = grid.geometry.interior_origin();
        let [nx, ny, nz] = grid.num_internal_cells();
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                let got = grid.field(field, coord).slice(s![gx..gx + nx, gy..gy + ny, gz..gz + nz]);
                let want = original
                    .field(field, coord)
                    .slice(s![gx..gx + nx, gy..gy + ny, gz..gz + nz]);
                for (a, b) in got.iter().zip(want.iter()) {
                    assert!((a - b).abs() < 1e-10, "{field:?}{coord:?}: {a} vs {b}");
                }
            }
        }
    }

    #[cfg(feature = "fft")]
    #[test]
    fn test_components_are_independent() {
        let mut grid = YeeGrid::new([4, 4, 4], [0.0; 3], [1.0; 3]).unwrap();
        grid.jy.fill(1.0);
        let mut spectral = SpectralGrid::for_grid(&grid).unwrap();
        let mut set = FieldTransformSet::new(TransformBackendKind::RustFft);
        set.initialize(&grid, &spectral).unwrap();

        set.transform(Field::J, Coordinate::Y, Direction::RealToComplex, &mut grid, &mut spectral)
            .unwrap();
        assert!((spectral.jy[[0, 0, 0]].re - 64.0).abs() < 1e-12);
        assert!(spectral.jx.iter().all(|v| v.norm() == 0.0));
        assert!(spectral.ey.iter().all(|v| v.norm() == 0.0));
    }

    #[cfg(feature = "fft")]
    #[test]
    fn test_transform_all_matches_component_by_component() {
        let mut grid = YeeGrid::new([5, 4, 6], [0.0; 3], [0.1, 0.2, 0.1]).unwrap();
        for (i, a) in grid.components_mut().into_iter().enumerate() {
            a.indexed_iter_mut()
                .for_each(|((x, y, z), v)| *v = ((x * 5 + y * 3 + z + i) as f64 * 0.21).cos());
        }
        let mut together = SpectralGrid::for_grid(&grid).unwrap();
        let mut one_by_one = together.clone();
        let mut set = FieldTransformSet::new(TransformBackendKind::RustFft);
        set.initialize(&grid, &together).unwrap();

        set.transform_all(Direction::RealToComplex, &mut grid, &mut together)
            .unwrap();
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                set.forward(field, coord, &grid, &mut one_by_one).unwrap();
                assert_eq!(together.field(field, coord), one_by_one.field(field, coord));
            }
        }
    }

    #[test]
    fn test_failed_set_initialize_leaves_nothing_bound() {
        let mut grid = YeeGrid::new([4, 4, 4], [0.0; 3], [1.0; 3]).unwrap();
        let spectral = SpectralGrid::for_grid(&grid).unwrap();
        let mut set = FieldTransformSet::new(TransformBackendKind::Disabled);
        set.initialize(&grid, &spectral).unwrap();
        assert!(set.is_bound());

        // Jx is bound after E and B, so they are already rebound when it fails.
        grid.jx = Array3::zeros((2, 2, 2));
        assert!(set.initialize(&grid, &spectral).is_err());
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                assert!(set.get(field, coord).binding().is_none(), "{field:?}{coord:?}");
            }
        }
    }

    #[test]
    fn test_initialize_rejects_mismatched_spectral_grid() {
        let grid = YeeGrid::new([4, 4, 4], [0.0; 3], [1.0; 3]).unwrap();
        let spectral = SpectralGrid::new([4, 4, 6]).unwrap();
        let mut set = FieldTransformSet::new(TransformBackendKind::Disabled);
        assert!(set.initialize(&grid, &spectral).is_err());
        set.teardown();
    }
}
