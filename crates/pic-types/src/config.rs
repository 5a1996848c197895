// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::DEFAULT_GUARD_CELLS;
use crate::error::{PicError, PicResult};
use crate::grid::{GridGeometry, InterpolationOrder, YeeGrid};
use crate::spectral::SpectralGrid;
use serde::{Deserialize, Serialize};

/// Top-level setup for one deposition + spectral transform stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub simulation_name: String,
    pub grid: GridConfig,
    pub deposition: DepositionConfig,
    #[serde(default)]
    pub transform: TransformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub num_internal_cells: [usize; 3],
    pub min_coords: [f64; 3],
    pub steps: [f64; 3],
    /// Guard layer on each side (default: 2)
    #[serde(default = "default_guard_cells")]
    pub guard_cells: usize,
}

fn default_guard_cells() -> usize {
    DEFAULT_GUARD_CELLS
}

/// Current deposition scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositionScheme {
    /// Linear weights at the current particle position.
    FirstOrder,
    /// Linear weights at the half-step retarded position.
    Cic,
    /// Quadratic weights at the half-step retarded position.
    Tsc,
}

impl DepositionScheme {
    pub fn order(self) -> InterpolationOrder {
        match self {
            DepositionScheme::FirstOrder | DepositionScheme::Cic => InterpolationOrder::Linear,
            DepositionScheme::Tsc => InterpolationOrder::Quadratic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositionConfig {
    pub scheme: DepositionScheme,
    /// Particle push time step; the time-centred schemes retard by half of it.
    #[serde(default)]
    pub time_step: f64,
}

/// FFT backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformBackendKind {
    #[default]
    RustFft,
    /// Every transform is a no-op.
    Disabled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub backend: TransformBackendKind,
}

impl SimulationConfig {
    /// Load and validate a JSON config file.
    pub fn from_file(path: &str) -> PicResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path, name = %config.simulation_name, "loaded simulation config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> PicResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PicResult<()> {
        self.grid.geometry()?;
        let dt = self.deposition.time_step;
        if !dt.is_finite() || dt < 0.0 {
            return Err(PicError::ConfigError(format!(
                "deposition.time_step must be finite and >= 0, got {dt}"
            )));
        }
        let need = self.deposition.scheme.order().guard_width();
        if self.grid.guard_cells < need {
            return Err(PicError::ConfigError(format!(
                "{:?} deposition needs >= {need} guard cells, grid has {}",
                self.deposition.scheme, self.grid.guard_cells
            )));
        }
        Ok(())
    }
}

impl GridConfig {
    pub fn geometry(&self) -> PicResult<GridGeometry> {
        GridGeometry::new(
            self.num_internal_cells,
            self.min_coords,
            self.steps,
            self.guard_cells,
        )
    }

    pub fn create_grid(&self) -> PicResult<YeeGrid> {
        Ok(YeeGrid::from_geometry(self.geometry()?))
    }

    pub fn create_spectral_grid(&self) -> PicResult<SpectralGrid> {
        SpectralGrid::new(self.num_internal_cells)
    }
}
