//! Saeta Sim - Monte-Carlo event generator for a planar RPC tracking detector
//!
//! Core modules:
//! - `sim`: Track sampling, events and digitization (seeded, deterministic)
//! - `config`: Detector geometry and sampler configuration
//! - `error`: Error taxonomy shared by the whole crate

pub mod config;
pub mod error;
pub mod sim;

pub use config::{DetectorConfig, SamplerConfig, T0Policy};
pub use error::{Result, SimError};
pub use sim::{
    AcceptancePolicy, Digitization, Digitizer, Event, GenerationReport, HitMatrix, Saeta,
    SimEvent, TrackCount, TrackSampler,
};

use glam::{DVec2, DVec3};

/// Default detector constants (Tragaldabas geometry)
///
/// Lengths in mm, times in ps.
pub mod consts {
    /// Number of detector planes
    pub const NPLAN: usize = 4;
    /// Number of digitized values per hit (kx, ky, kt)
    pub const NDAC: usize = 3;

    /// Plane heights above the floor
    pub const VZ0: [f64; NPLAN] = [1826.0, 1304.0, 924.0, 87.0];
    /// Plane depths measured from the reference plane (increasing)
    pub const VZ1: [f64; NPLAN] = [
        VZ0[0] - VZ0[0],
        VZ0[0] - VZ0[1],
        VZ0[0] - VZ0[2],
        VZ0[0] - VZ0[3],
    ];
    /// Total depth of the stack
    pub const LENZ: f64 = VZ1[NPLAN - 1] - VZ1[0];

    /// Detector footprint
    pub const LENX: f64 = 1500.0;
    pub const LENY: f64 = 1200.0;

    /// Cells per plane
    pub const NCX: usize = 12;
    pub const NCY: usize = 10;
    /// Cell pitch
    pub const WCX: f64 = LENX / NCX as f64;
    pub const WCY: f64 = LENY / NCY as f64;

    /// Time quantization step
    pub const DT: f64 = 100.0;

    /// Maximum polar angle (degrees)
    pub const THMAX: f64 = 10.0;
    /// Default number of tracks per event
    pub const NTRACK: usize = 1;

    /// Speed of light (mm/ps)
    pub const SC: f64 = 0.3;
    /// Default slowness (ps/mm)
    pub const SINI: f64 = 1.0 / SC;
    /// Reference time origin
    pub const TINI: f64 = 1000.0;

    /// Attempt ceiling for forced acceptance
    pub const MAX_ATTEMPTS: u64 = 1_000_000;
}

/// Direction cosines (cx, cy, cz) of a unit vector with polar angle `theta`
/// and azimuth `phi` (radians)
#[inline]
pub fn direction_cosines(theta: f64, phi: f64) -> DVec3 {
    let (sin_th, cos_th) = theta.sin_cos();
    let (sin_ph, cos_ph) = phi.sin_cos();
    DVec3::new(sin_th * cos_ph, sin_th * sin_ph, cos_th)
}

/// Projected slopes (dx/dz, dy/dz) of a direction
///
/// Returns `None` for horizontal or downward directions where the slope is
/// undefined.
#[inline]
pub fn projected_slopes(dir: DVec3) -> Option<DVec2> {
    if dir.z <= 0.0 {
        return None;
    }
    let slopes = DVec2::new(dir.x / dir.z, dir.y / dir.z);
    slopes.is_finite().then_some(slopes)
}

/// Path length per unit depth of a straight line with slopes `(xp, yp)`
#[inline]
pub fn path_factor(xp: f64, yp: f64) -> f64 {
    (1.0 + xp * xp + yp * yp).sqrt()
}
