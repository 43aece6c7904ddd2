//! Error types for event generation and digitization

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Sampling exhausted: {accepted}/{target} tracks accepted after {attempts} attempts")]
    SamplingExhausted {
        target: usize,
        accepted: usize,
        attempts: u64,
    },

    /// A direction at or below the horizontal; unreachable once
    /// `SamplerConfig::validate` has bounded the cone below 90 degrees
    #[error("Degenerate geometry: direction (theta={theta}, phi={phi}) has no defined slope")]
    DegenerateGeometry { theta: f64, phi: f64 },

    #[error("Invalid multiplicity distribution: {0}")]
    Multiplicity(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
