// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Spectral Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Frequency-space counterpart of [`YeeGrid`](crate::grid::YeeGrid).

use crate::error::{PicError, PicResult};
use crate::grid::{Coordinate, Field, YeeGrid};
use ndarray::Array3;
use num_complex::Complex64;

/// Extents of the conjugate-symmetry-compacted array for a real
/// transform of logical size `size`: the last axis keeps `n/2 + 1` bins.
pub fn complex_extent(size: [usize; 3]) -> [usize; 3] {
    [size[0], size[1], size[2] / 2 + 1]
}

/// Nine complex arrays, one per real field component.
#[derive(Debug, Clone)]
pub struct SpectralGrid {
    /// Logical real-space size the spectra belong to.
    pub size: [usize; 3],
    pub ex: Array3<Complex64>,
    pub ey: Array3<Complex64>,
    pub ez: Array3<Complex64>,
    pub bx: Array3<Complex64>,
    pub by: Array3<Complex64>,
    pub bz: Array3<Complex64>,
    pub jx: Array3<Complex64>,
    pub jy: Array3<Complex64>,
    pub jz: Array3<Complex64>,
}

impl SpectralGrid {
    pub fn new(size: [usize; 3]) -> PicResult<Self> {
        if size.iter().any(|&n| n == 0) {
            return Err(PicError::InvalidGrid(format!(
                "spectral grid size must be >= 1 on every axis, got {size:?}"
            )));
        }
        let [nx, ny, nzc] = complex_extent(size);
        let zeros = || Array3::from_elem((nx, ny, nzc), Complex64::new(0.0, 0.0));
        Ok(SpectralGrid {
            size,
            ex: zeros(),
            ey: zeros(),
            ez: zeros(),
            bx: zeros(),
            by: zeros(),
            bz: zeros(),
            jx: zeros(),
            jy: zeros(),
            jz: zeros(),
        })
    }

    /// Spectral grid matching the interior extents of `grid`.
    pub fn for_grid(grid: &YeeGrid) -> PicResult<Self> {
        Self::new(grid.num_internal_cells())
    }

    pub fn complex_size(&self) -> [usize; 3] {
        complex_extent(self.size)
    }

    pub fn field(&self, field: Field, coord: Coordinate) -> &Array3<Complex64> {
        match (field, coord) {
            (Field::E, Coordinate::X) => &self.ex,
            (Field::E, Coordinate::Y) => &self.ey,
            (Field::E, Coordinate::Z) => &self.ez,
            (Field::B, Coordinate::X) => &self.bx,
            (Field::B, Coordinate::Y) => &self.by,
            (Field::B, Coordinate::Z) => &self.bz,
            (Field::J, Coordinate::X) => &self.jx,
            (Field::J, Coordinate::Y) => &self.jy,
            (Field::J, Coordinate::Z) => &self.jz,
        }
    }

    pub fn field_mut(&mut self, field: Field, coord: Coordinate) -> &mut Array3<Complex64> {
        match (field, coord) {
            (Field::E, Coordinate::X) => &mut self.ex,
            (Field::E, Coordinate::Y) => &mut self.ey,
            (Field::E, Coordinate::Z) => &mut self.ez,
            (Field::B, Coordinate::X) => &mut self.bx,
            (Field::B, Coordinate::Y) => &mut self.by,
            (Field::B, Coordinate::Z) => &mut self.bz,
            (Field::J, Coordinate::X) => &mut self.jx,
            (Field::J, Coordinate::Y) => &mut self.jy,
            (Field::J, Coordinate::Z) => &mut self.jz,
        }
    }

    /// Same order as [`YeeGrid::components_mut`].
    pub fn components_mut(&mut self) -> [&mut Array3<Complex64>; 9] {
        [
            &mut self.ex,
            &mut self.ey,
            &mut self.ez,
            &mut self.bx,
            &mut self.by,
            &mut self.bz,
            &mut self.jx,
            &mut self.jy,
            &mut self.jz,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_extent_halves_last_axis() {
        assert_eq!(complex_extent([10, 7, 12]), [10, 7, 7]);
        assert_eq!(complex_extent([4, 4, 5]), [4, 4, 3]);
        assert_eq!(complex_extent([3, 3, 1]), [3, 3, 1]);
    }

    #[test]
    fn test_for_grid_uses_interior_extents() {
        let grid = YeeGrid::new([10, 7, 12], [0.0; 3], [0.1, 0.2, 0.1]).unwrap();
        let spectral = SpectralGrid::for_grid(&grid).unwrap();
        assert_eq!(spectral.size, [10, 7, 12]);
        for field in Field::ALL {
            for coord in Coordinate::ALL {
                assert_eq!(spectral.field(field, coord).shape(), &[10, 7, 7]);
            }
        }
    }

    #[test]
    fn test_components_mut_matches_field_lookup() {
        let mut spectral = SpectralGrid::new([2, 2, 2]).unwrap();
        spectral.components_mut()[5].fill(Complex64::new(1.0, 0.0));
        assert!(spectral.field(Field::B, Coordinate::Z).iter().all(|v| v.re == 1.0));
        assert!(spectral.by.iter().all(|v| v.re == 0.0));
    }

    #[test]
    fn test_rejects_empty_size() {
        assert!(SpectralGrid::new([4, 0, 4]).is_err());
    }
}
