//! Detector geometry and sampler configuration
//!
//! Both structs default to the constants in [`crate::consts`] and can be
//! loaded from JSON. Validation runs when a sampler or digitizer is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// How the time origin of each track is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum T0Policy {
    /// `T0 = (0.5 + u) * t_ref` with `u ~ U[0, 1)`
    #[default]
    Randomized,
    /// `T0 = t_ref`
    Fixed,
}

/// Detector geometry shared by the sampler and the digitizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Plane depths, strictly increasing from the reference plane
    pub plane_depths: Vec<f64>,
    /// Footprint along X
    pub width: f64,
    /// Footprint along Y
    pub length: f64,
    /// Cell pitch along X
    pub cell_width_x: f64,
    /// Cell pitch along Y
    pub cell_width_y: f64,
    /// Time quantization step
    pub time_step: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            plane_depths: VZ1.to_vec(),
            width: LENX,
            length: LENY,
            cell_width_x: WCX,
            cell_width_y: WCY,
            time_step: DT,
        }
    }
}

impl DetectorConfig {
    /// Number of planes
    pub fn num_planes(&self) -> usize {
        self.plane_depths.len()
    }

    /// Depth of the reference (first) plane
    pub fn reference_depth(&self) -> f64 {
        self.plane_depths.first().copied().unwrap_or(0.0)
    }

    /// Distance from the reference plane to the last plane
    pub fn total_depth(&self) -> f64 {
        self.plane_depths.last().copied().unwrap_or(0.0) - self.reference_depth()
    }

    /// Check the geometry, rejecting anything the digitizer cannot handle
    pub fn validate(&self) -> Result<()> {
        if self.plane_depths.is_empty() {
            return Err(SimError::Configuration("plane list is empty".into()));
        }
        if self.plane_depths.iter().any(|z| !z.is_finite()) {
            return Err(SimError::Configuration("plane depths must be finite".into()));
        }
        if let Some(w) = self.plane_depths.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SimError::Configuration(format!(
                "plane depths must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        if !(self.width >= 0.0 && self.length >= 0.0) {
            return Err(SimError::Configuration(format!(
                "detector footprint must be non-negative, got {} x {}",
                self.width, self.length
            )));
        }
        for (name, value) in [
            ("cell_width_x", self.cell_width_x),
            ("cell_width_y", self.cell_width_y),
            ("time_step", self.time_step),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::Configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON geometry
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON geometry from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded detector geometry from {} ({} planes)",
            path.as_ref().display(),
            config.num_planes()
        );
        Ok(config)
    }
}

/// Kinematic sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Maximum polar angle in degrees, in `[0, 90)`
    pub theta_max_deg: f64,
    /// Slowness assigned to every track
    pub slowness: f64,
    /// Reference time origin
    pub t_ref: f64,
    /// Time origin policy
    #[serde(default)]
    pub t0_policy: T0Policy,
    /// Attempt ceiling under forced acceptance
    pub max_attempts: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            theta_max_deg: THMAX,
            slowness: SINI,
            t_ref: TINI,
            t0_policy: T0Policy::Randomized,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..90.0).contains(&self.theta_max_deg) {
            return Err(SimError::Configuration(format!(
                "theta_max_deg must lie in [0, 90), got {}",
                self.theta_max_deg
            )));
        }
        if !(self.slowness > 0.0 && self.slowness.is_finite()) {
            return Err(SimError::Configuration(format!(
                "slowness must be positive, got {}",
                self.slowness
            )));
        }
        if !self.t_ref.is_finite() {
            return Err(SimError::Configuration("t_ref must be finite".into()));
        }
        if self.max_attempts == 0 {
            return Err(SimError::Configuration("max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate JSON sampler parameters
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load JSON sampler parameters from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded sampler settings from {} (theta_max={} deg)",
            path.as_ref().display(),
            config.theta_max_deg
        );
        Ok(config)
    }

    /// Cosine of the maximum polar angle
    pub fn cos_theta_max(&self) -> f64 {
        self.theta_max_deg.to_radians().cos()
    }
}
