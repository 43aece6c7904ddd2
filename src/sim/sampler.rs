//! Track generation
//!
//! Tracks are drawn isotropically in solid angle inside a cone of half-angle
//! `theta_max`, with their origin uniform over the detector footprint at the
//! reference plane. A track is kept only if its straight-line extrapolation
//! leaves the stack through the footprint.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use super::event::{Event, Saeta};
use crate::config::{DetectorConfig, SamplerConfig, T0Policy};
use crate::consts::NTRACK;
use crate::error::{Result, SimError};
use crate::{direction_cosines, projected_slopes};

/// Multiplicities drawn by [`TrackCount::Auto`]
pub const MULTIPLICITIES: [usize; 4] = [1, 2, 3, 4];
/// Probability of each entry in [`MULTIPLICITIES`]
pub const MULTIPLICITY_PROBS: [f64; 4] = [0.9, 0.09, 0.009, 0.001];

/// Requested number of tracks per event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackCount {
    Fixed(usize),
    /// Realistic low multiplicity, heavily weighted toward single tracks
    Auto,
}

impl Default for TrackCount {
    fn default() -> Self {
        TrackCount::Fixed(NTRACK)
    }
}

impl TrackCount {
    /// Turn the request into a concrete count, drawing from `rng` if needed
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        match *self {
            TrackCount::Fixed(n) => Ok(n),
            TrackCount::Auto => random_multiplicity(rng),
        }
    }
}

/// Draw a multiplicity from {1, 2, 3, 4} with probabilities
/// {0.9, 0.09, 0.009, 0.001}
pub fn random_multiplicity<R: Rng>(rng: &mut R) -> Result<usize> {
    let dist = WeightedIndex::<f64>::new(MULTIPLICITY_PROBS)
        .map_err(|e| SimError::Multiplicity(e.to_string()))?;
    Ok(MULTIPLICITIES[dist.sample(rng)])
}

/// Acceptance policy driving the generation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptancePolicy {
    /// Sample until exactly `target` tracks are accepted
    ForcedAcceptance { target: TrackCount },
    /// Make exactly `target` attempts, keeping whichever are accepted
    CappedAttempts { target: TrackCount },
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        AcceptancePolicy::ForcedAcceptance {
            target: TrackCount::default(),
        }
    }
}

impl AcceptancePolicy {
    /// `all_tracks_in = true` forces every requested track into the detector
    pub fn from_flag(all_tracks_in: bool, target: TrackCount) -> Self {
        if all_tracks_in {
            AcceptancePolicy::ForcedAcceptance { target }
        } else {
            AcceptancePolicy::CappedAttempts { target }
        }
    }

    pub fn target(&self) -> TrackCount {
        match *self {
            AcceptancePolicy::ForcedAcceptance { target }
            | AcceptancePolicy::CappedAttempts { target } => target,
        }
    }

    pub fn all_tracks_in(&self) -> bool {
        matches!(self, AcceptancePolicy::ForcedAcceptance { .. })
    }
}

/// Outcome of one sampling attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub saeta: Saeta,
    /// Lateral position where the track leaves the last plane
    pub exit: DVec2,
    /// Whether the track stays inside the footprint over the whole stack
    pub accepted: bool,
}

/// Bookkeeping for one call to [`TrackSampler::generate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Resolved target count
    pub requested: usize,
    /// Tracks appended to the event
    pub accepted: usize,
    /// Sampling attempts made
    pub attempts: u64,
}

impl GenerationReport {
    pub fn rejected(&self) -> u64 {
        self.attempts - self.accepted as u64
    }
}

/// Samples events of accepted tracks for one detector geometry
#[derive(Debug, Clone)]
pub struct TrackSampler {
    detector: DetectorConfig,
    config: SamplerConfig,
    policy: AcceptancePolicy,
}

impl TrackSampler {
    pub fn new(
        detector: DetectorConfig,
        config: SamplerConfig,
        policy: AcceptancePolicy,
    ) -> Result<Self> {
        detector.validate()?;
        config.validate()?;
        Ok(Self {
            detector,
            config,
            policy,
        })
    }

    pub fn detector(&self) -> &DetectorConfig {
        &self.detector
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    /// Draw (theta, phi): uniform in cos(theta) on `[cos theta_max, 1]` and
    /// uniform in phi on `[0, 2pi)`
    pub fn random_angles<R: Rng>(&self, rng: &mut R) -> (f64, f64) {
        let cos_theta_max = self.config.cos_theta_max();
        let cos_theta = 1.0 - rng.random::<f64>() * (1.0 - cos_theta_max);
        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let phi = rng.random::<f64>() * TAU;
        (theta, phi)
    }

    /// Time origin according to the configured policy
    pub fn set_t0<R: Rng>(&self, rng: &mut R) -> f64 {
        match self.config.t0_policy {
            T0Policy::Randomized => (0.5 + rng.random::<f64>()) * self.config.t_ref,
            T0Policy::Fixed => self.config.t_ref,
        }
    }

    /// Footprint test on the exit position (strict on both axes)
    pub fn in_footprint(&self, exit: DVec2) -> bool {
        let half = DVec2::new(self.detector.width, self.detector.length) / 2.0;
        let mid = (exit - half).abs();
        mid.x < half.x && mid.y < half.y
    }

    /// Sample a single track and run the footprint test on it
    pub fn sample_one_track<R: Rng>(&self, rng: &mut R) -> Result<Candidate> {
        let (theta, phi) = self.random_angles(rng);

        let x0 = rng.random::<f64>() * self.detector.width;
        let y0 = rng.random::<f64>() * self.detector.length;
        let t0 = self.set_t0(rng);
        let s0 = self.config.slowness;

        let slopes = projected_slopes(direction_cosines(theta, phi))
            .ok_or(SimError::DegenerateGeometry { theta, phi })?;

        let saeta = Saeta::new(x0, slopes.x, y0, slopes.y, t0, s0);
        let exit = saeta.position_at(self.detector.total_depth());

        Ok(Candidate {
            saeta,
            exit,
            accepted: self.in_footprint(exit),
        })
    }

    /// Generate one event under the configured policy
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<(Event, GenerationReport)> {
        let requested = self.policy.target().resolve(rng)?;
        let mut event = Event::new();
        let mut report = GenerationReport {
            requested,
            ..Default::default()
        };

        match self.policy {
            AcceptancePolicy::ForcedAcceptance { .. } => {
                while event.multiplicity() < requested {
                    if report.attempts >= self.config.max_attempts {
                        log::error!(
                            "Gave up after {} attempts with {}/{} tracks accepted",
                            report.attempts,
                            event.multiplicity(),
                            requested
                        );
                        return Err(SimError::SamplingExhausted {
                            target: requested,
                            accepted: event.multiplicity(),
                            attempts: report.attempts,
                        });
                    }
                    report.attempts += 1;
                    self.keep_if_accepted(self.sample_one_track(rng)?, &mut event);
                }
            }
            AcceptancePolicy::CappedAttempts { .. } => {
                for _ in 0..requested {
                    report.attempts += 1;
                    self.keep_if_accepted(self.sample_one_track(rng)?, &mut event);
                }
            }
        }

        report.accepted = event.multiplicity();
        log::info!(
            "Generated {}/{} tracks in {} attempts ({})",
            report.accepted,
            report.requested,
            report.attempts,
            if self.policy.all_tracks_in() { "forced" } else { "capped" }
        );
        Ok((event, report))
    }

    fn keep_if_accepted(&self, candidate: Candidate, event: &mut Event) {
        if candidate.accepted {
            log::debug!("Accepted track: {}", candidate.saeta);
            event.add_saeta(candidate.saeta);
        } else {
            log::debug!(
                "Rejected track leaving at ({:.1}, {:.1})",
                candidate.exit.x,
                candidate.exit.y
            );
        }
    }
}
