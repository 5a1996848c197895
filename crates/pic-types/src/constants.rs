// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Elementary charge (C)
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Electron charge (C), negative by convention.
pub const ELECTRON_CHARGE: f64 = -ELEMENTARY_CHARGE;

/// Electron rest mass (kg)
pub const ELECTRON_MASS: f64 = 9.1093837015e-31;

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

/// Guard layer width used when a grid is built without an explicit one.
///
/// Both stencils stay inside the array while the deposition position
/// (after any half-step retardation) lies less than half a cell beyond
/// the interior on every axis. Past that, the quadratic stencil of an
/// unstaggered axis leaves the array at the upper edge and the scatter
/// panics.
pub const DEFAULT_GUARD_CELLS: usize = 2;
