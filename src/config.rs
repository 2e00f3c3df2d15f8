use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Transport coefficients of the cell model.
///
/// Values outside the physically sensible range (negative `q`, `d` above 1)
/// are accepted; only non-finite values are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Rolling/sliding diffusion coefficient.
    pub d: f64,
    /// Saltation entrainment rate per cell per step.
    pub q: f64,
    /// Base saltation length.
    pub l0: f64,
    /// Saltation length gain per unit elevation.
    pub b: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            d: 0.8,
            q: 0.6,
            l0: 7.3,
            b: 2.0,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [("D", self.d), ("Q", self.q), ("L0", self.l0), ("b", self.b)] {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFiniteParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Everything needed to build and run an engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub xgrid: usize,
    pub ygrid: usize,
    pub steps: usize,
    pub seed: u64,
    /// Record every n-th step for export. 0 disables recording.
    pub frame_stride: usize,
    pub params: Params,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            xgrid: 100,
            ygrid: 50,
            steps: 100,
            seed: 42,
            frame_stride: 1,
            params: Params::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.xgrid == 0 || self.ygrid == 0 {
            return Err(ConfigurationError::InvalidGridShape {
                xgrid: self.xgrid,
                ygrid: self.ygrid,
            });
        }
        self.params.validate()
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigurationError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}
