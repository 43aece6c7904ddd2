//! Event simulation module
//!
//! Generation and digitization live here. Everything is deterministic for a
//! given seed:
//! - Explicit, injected RNG only
//! - Tracks kept in generation order
//! - No I/O

pub mod digitize;
pub mod event;
pub mod sampler;

pub use digitize::{Digitization, Digitizer, HitMatrix, cell_center, quantize, quantize_time};
pub use event::{Event, NPAR, Saeta};
pub use sampler::{
    AcceptancePolicy, Candidate, GenerationReport, TrackCount, TrackSampler, random_multiplicity,
};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{DetectorConfig, SamplerConfig};
use crate::error::Result;

/// A generated event together with its (optional) digitization
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// Seed the event was generated with
    pub seed: u64,
    event: Event,
    report: GenerationReport,
    digitizer: Digitizer,
    digitization: Option<Digitization>,
}

impl SimEvent {
    /// Generate an event with the default detector and sampler settings
    pub fn new(seed: u64, all_tracks_in: bool, target: TrackCount) -> Result<Self> {
        Self::with_config(
            seed,
            DetectorConfig::default(),
            SamplerConfig::default(),
            AcceptancePolicy::from_flag(all_tracks_in, target),
        )
    }

    pub fn with_config(
        seed: u64,
        detector: DetectorConfig,
        config: SamplerConfig,
        policy: AcceptancePolicy,
    ) -> Result<Self> {
        let digitizer = Digitizer::new(detector.clone())?;
        let sampler = TrackSampler::new(detector, config, policy)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let (event, report) = sampler.generate(&mut rng)?;
        log::info!("Event generated with seed {seed}: {} track(s)", event.multiplicity());

        Ok(Self {
            seed,
            event,
            report,
            digitizer,
            digitization: None,
        })
    }

    /// Generated event; frozen once generation is done
    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    /// Number of tracks that made it into the detector
    pub fn tracks_number(&self) -> usize {
        self.event.multiplicity()
    }

    /// Digitize the event (computed once, then cached)
    pub fn digitize(&mut self) -> &Digitization {
        self.digitization
            .get_or_insert_with(|| self.digitizer.digitize(&self.event))
    }

    pub fn digitization(&self) -> Option<&Digitization> {
        self.digitization.as_ref()
    }
}
