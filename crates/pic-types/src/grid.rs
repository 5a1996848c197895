// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Yee Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Staggered 3D field grid.
//!
//! Array index 0 along each axis sits at `min_coords - guard * step`;
//! interior cells start at index `guard`. Components are stored at the
//! Yee offsets returned by [`stagger`].

use crate::constants::DEFAULT_GUARD_CELLS;
use crate::error::{PicError, PicResult};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Shape-function order used for an index query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationOrder {
    /// Cloud-in-cell, two nodes per axis.
    Linear,
    /// Triangular-shaped cloud, three nodes per axis.
    Quadratic,
}

impl InterpolationOrder {
    /// Number of stencil nodes along one axis.
    pub fn support_width(self) -> usize {
        match self {
            InterpolationOrder::Linear => 2,
            InterpolationOrder::Quadratic => 3,
        }
    }

    /// Minimum guard layer for particles anywhere inside the interior.
    pub fn guard_width(self) -> usize {
        match self {
            InterpolationOrder::Linear => 1,
            InterpolationOrder::Quadratic => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    E,
    B,
    J,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::E, Field::B, Field::J];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    X,
    Y,
    Z,
}

impl Coordinate {
    pub const ALL: [Coordinate; 3] = [Coordinate::X, Coordinate::Y, Coordinate::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Yee offset of a field component inside its cell, in units of the step.
pub fn stagger(field: Field, coord: Coordinate) -> [f64; 3] {
    match (field, coord) {
        (Field::E | Field::J, Coordinate::X) => [0.5, 0.0, 0.0],
        (Field::E | Field::J, Coordinate::Y) => [0.0, 0.5, 0.0],
        (Field::E | Field::J, Coordinate::Z) => [0.0, 0.0, 0.5],
        (Field::B, Coordinate::X) => [0.0, 0.5, 0.5],
        (Field::B, Coordinate::Y) => [0.5, 0.0, 0.5],
        (Field::B, Coordinate::Z) => [0.5, 0.5, 0.0],
    }
}

/// Result of an index query: the stencil anchor node and the position
/// of the particle relative to it, in cell units.
///
/// For [`InterpolationOrder::Linear`] the anchor is the lower node and
/// `offset` lies in `[0, 1)`. For [`InterpolationOrder::Quadratic`] the
/// anchor is the nearest node and `offset` lies in `[-0.5, 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilAnchor {
    pub index: [isize; 3],
    pub offset: [f64; 3],
}

/// Geometry of a uniform staggered grid, independent of its storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub num_internal_cells: [usize; 3],
    pub num_guard_cells: usize,
    pub num_cells: [usize; 3],
    pub min_coords: [f64; 3],
    pub max_coords: [f64; 3],
    pub steps: [f64; 3],
    origin: [f64; 3],
}

impl GridGeometry {
    pub fn new(
        num_internal_cells: [usize; 3],
        min_coords: [f64; 3],
        steps: [f64; 3],
        num_guard_cells: usize,
    ) -> PicResult<Self> {
        if num_internal_cells.iter().any(|&n| n == 0) {
            return Err(PicError::InvalidGrid(format!(
                "interior extents must be >= 1, got {num_internal_cells:?}"
            )));
        }
        if steps.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PicError::InvalidGrid(format!(
                "grid steps must be finite and > 0, got {steps:?}"
            )));
        }
        if min_coords.iter().any(|c| !c.is_finite()) {
            return Err(PicError::InvalidGrid(format!(
                "min_coords must be finite, got {min_coords:?}"
            )));
        }

        let mut num_cells = [0usize; 3];
        let mut max_coords = [0.0; 3];
        let mut origin = [0.0; 3];
        for a in 0..3 {
            num_cells[a] = num_internal_cells[a] + 2 * num_guard_cells;
            max_coords[a] = min_coords[a] + num_internal_cells[a] as f64 * steps[a];
            origin[a] = min_coords[a] - num_guard_cells as f64 * steps[a];
        }

        Ok(GridGeometry {
            num_internal_cells,
            num_guard_cells,
            num_cells,
            min_coords,
            max_coords,
            steps,
            origin,
        })
    }

    pub fn cell_volume(&self) -> f64 {
        self.steps[0] * self.steps[1] * self.steps[2]
    }

    /// Array index of the first interior cell along each axis.
    pub fn interior_origin(&self) -> [usize; 3] {
        [self.num_guard_cells; 3]
    }

    /// Physical coordinates of array node `index` of a component.
    pub fn node_position(&self, field: Field, coord: Coordinate, index: [usize; 3]) -> [f64; 3] {
        let shift = stagger(field, coord);
        let mut p = [0.0; 3];
        for a in 0..3 {
            p[a] = self.origin[a] + (index[a] as f64 + shift[a]) * self.steps[a];
        }
        p
    }

    /// Locate `position` on the sub-grid of one field component.
    pub fn index_of(
        &self,
        field: Field,
        coord: Coordinate,
        position: [f64; 3],
        order: InterpolationOrder,
    ) -> StencilAnchor {
        let shift = stagger(field, coord);
        let mut index = [0isize; 3];
        let mut offset = [0.0; 3];
        for a in 0..3 {
            let u = (position[a] - self.origin[a]) / self.steps[a] - shift[a];
            let node = match order {
                InterpolationOrder::Linear => u.floor(),
                InterpolationOrder::Quadratic => (u + 0.5).floor(),
            };
            index[a] = node as isize;
            offset[a] = u - node;
        }
        StencilAnchor { index, offset }
    }

    /// Index query for the current-density component `coord`.
    pub fn current_index(
        &self,
        coord: Coordinate,
        position: [f64; 3],
        order: InterpolationOrder,
    ) -> StencilAnchor {
        self.index_of(Field::J, coord, position, order)
    }
}

/// Staggered grid holding E, B and J as nine scalar arrays.
#[derive(Debug, Clone)]
pub struct YeeGrid {
    pub geometry: GridGeometry,
    pub ex: Array3<f64>,
    pub ey: Array3<f64>,
    pub ez: Array3<f64>,
    pub bx: Array3<f64>,
    pub by: Array3<f64>,
    pub bz: Array3<f64>,
    pub jx: Array3<f64>,
    pub jy: Array3<f64>,
    pub jz: Array3<f64>,
}

impl YeeGrid {
    /// Grid with the default guard layer.
    pub fn new(
        num_internal_cells: [usize; 3],
        min_coords: [f64; 3],
        steps: [f64; 3],
    ) -> PicResult<Self> {
        Self::with_guard_cells(num_internal_cells, min_coords, steps, DEFAULT_GUARD_CELLS)
    }

    pub fn with_guard_cells(
        num_internal_cells: [usize; 3],
        min_coords: [f64; 3],
        steps: [f64; 3],
        num_guard_cells: usize,
    ) -> PicResult<Self> {
        let geometry = GridGeometry::new(num_internal_cells, min_coords, steps, num_guard_cells)?;
        Ok(Self::from_geometry(geometry))
    }

    pub fn from_geometry(geometry: GridGeometry) -> Self {
        let [nx, ny, nz] = geometry.num_cells;
        let zeros = || Array3::zeros((nx, ny, nz));
        tracing::debug!(
            interior = ?geometry.num_internal_cells,
            guard = geometry.num_guard_cells,
            "allocated Yee grid"
        );
        YeeGrid {
            geometry,
            ex: zeros(),
            ey: zeros(),
            ez: zeros(),
            bx: zeros(),
            by: zeros(),
            bz: zeros(),
            jx: zeros(),
            jy: zeros(),
            jz: zeros(),
        }
    }

    pub fn num_cells(&self) -> [usize; 3] {
        self.geometry.num_cells
    }

    pub fn num_internal_cells(&self) -> [usize; 3] {
        self.geometry.num_internal_cells
    }

    pub fn steps(&self) -> [f64; 3] {
        self.geometry.steps
    }

    pub fn cell_volume(&self) -> f64 {
        self.geometry.cell_volume()
    }

    pub fn field(&self, field: Field, coord: Coordinate) -> &Array3<f64> {
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

    pub fn field_mut(&mut self, field: Field, coord: Coordinate) -> &mut Array3<f64> {
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

    pub fn zeroize_current(&mut self) {
        self.jx.fill(0.0);
        self.jy.fill(0.0);
        self.jz.fill(0.0);
    }

    pub fn current_index(
        &self,
        coord: Coordinate,
        position: [f64; 3],
        order: InterpolationOrder,
    ) -> StencilAnchor {
        self.geometry.current_index(coord, position, order)
    }

    /// Geometry together with exclusive access to Jx, Jy, Jz.
    pub fn current_mut(&mut self) -> (&GridGeometry, [&mut Array3<f64>; 3]) {
        (
            &self.geometry,
            [&mut self.jx, &mut self.jy, &mut self.jz],
        )
    }

    /// All nine arrays, ordered E, B, J and x, y, z within each field.
    pub fn components_mut(&mut self) -> [&mut Array3<f64>; 9] {
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
