//! Digitization: projection of tracks onto the planes and cell quantization
//!
//! For every (track, plane) pair the impact point `(x, y, t)` is computed and
//! quantized to `(kx, ky, kt)`. Spatial indices are pure cell numbers; the
//! time index is kept in physical units as a multiple of the time step.

use glam::DVec3;

use super::event::{Event, Saeta};
use crate::config::DetectorConfig;
use crate::consts::NDAC;
use crate::error::Result;
use crate::path_factor;

/// Cell index of `value` for cells of width `pitch`, centred on multiples of
/// `pitch`
#[inline]
pub fn quantize(value: f64, pitch: f64) -> i64 {
    ((value + pitch / 2.0) / pitch).floor() as i64
}

/// Nearest multiple of `dt` to `t`
#[inline]
pub fn quantize_time(t: f64, dt: f64) -> f64 {
    ((t + dt / 2.0) / dt).floor() * dt
}

/// Centre of cell `k`
#[inline]
pub fn cell_center(k: i64, pitch: f64) -> f64 {
    k as f64 * pitch
}

/// Row-major matrix with a fixed column count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HitMatrix {
    cols: usize,
    data: Vec<f64>,
}

impl HitMatrix {
    pub(crate) fn with_capacity(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            data: Vec::with_capacity(rows * cols),
        }
    }

    pub fn rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.data.len() / self.cols
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a row; its length must match the column count
    pub(crate) fn push_row(&mut self, row: &[f64]) {
        assert_eq!(row.len(), self.cols, "row width does not match matrix");
        self.data.extend_from_slice(row);
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if self.cols == 0 {
            return None;
        }
        let start = index.checked_mul(self.cols)?;
        self.data.get(start..start.checked_add(self.cols)?)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.cols {
            return None;
        }
        self.row(row).map(|r| r[col])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols.max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Hit matrices for one event
#[derive(Debug, Clone, PartialEq)]
pub struct Digitization {
    /// `(x, y, t)` per plane, one row per track
    pub hit_coords: HitMatrix,
    /// `(kx, ky, kt)` per plane, one row per track
    pub hit_digits: HitMatrix,
}

impl Digitization {
    pub fn num_planes(&self) -> usize {
        self.hit_digits.cols() / NDAC
    }

    /// Continuous and quantized hit of `track` on `plane`
    pub fn hit(&self, track: usize, plane: usize) -> Option<(DVec3, DVec3)> {
        if plane >= self.num_planes() {
            return None;
        }
        let col = plane * NDAC;
        let point = self.hit_coords.row(track)?;
        let digit = self.hit_digits.row(track)?;
        Some((
            DVec3::from_slice(&point[col..col + NDAC]),
            DVec3::from_slice(&digit[col..col + NDAC]),
        ))
    }

    /// Flat list of `[plane, kx, ky, kt]`, ordered by track then plane
    pub fn hit_list(&self) -> Vec<[f64; 4]> {
        self.hit_digits
            .iter_rows()
            .flat_map(|row| {
                row.chunks_exact(NDAC)
                    .enumerate()
                    .map(|(plane, d)| [plane as f64, d[0], d[1], d[2]])
            })
            .collect()
    }
}

/// Projects events through the plane stack of one detector
#[derive(Debug, Clone)]
pub struct Digitizer {
    detector: DetectorConfig,
}

impl Digitizer {
    pub fn new(detector: DetectorConfig) -> Result<Self> {
        detector.validate()?;
        Ok(Self { detector })
    }

    pub fn detector(&self) -> &DetectorConfig {
        &self.detector
    }

    /// Columns of each output matrix
    pub fn cols(&self) -> usize {
        self.detector.num_planes() * NDAC
    }

    /// Impact point `(x, y, t)` of `saeta` at `dz` below the reference plane
    pub fn project(&self, saeta: &Saeta, dz: f64) -> DVec3 {
        let pos = saeta.position_at(dz);
        let ks = path_factor(saeta.xp, saeta.yp);
        DVec3::new(pos.x, pos.y, saeta.t0 + ks * saeta.s0 * dz)
    }

    /// Quantized `(kx, ky, kt)` of an impact point
    pub fn quantize_point(&self, point: DVec3) -> DVec3 {
        DVec3::new(
            quantize(point.x, self.detector.cell_width_x) as f64,
            quantize(point.y, self.detector.cell_width_y) as f64,
            quantize_time(point.z, self.detector.time_step),
        )
    }

    /// Build `hit_coords` and `hit_digits` for every track in `event`
    pub fn digitize(&self, event: &Event) -> Digitization {
        let cols = self.cols();
        let z_ref = self.detector.reference_depth();
        let mut hit_coords = HitMatrix::with_capacity(event.multiplicity(), cols);
        let mut hit_digits = HitMatrix::with_capacity(event.multiplicity(), cols);

        let mut points = Vec::with_capacity(cols);
        let mut digits = Vec::with_capacity(cols);
        for saeta in event.saetas() {
            points.clear();
            digits.clear();
            for &z in &self.detector.plane_depths {
                let point = self.project(saeta, z - z_ref);
                points.extend_from_slice(&point.to_array());
                digits.extend_from_slice(&self.quantize_point(point).to_array());
            }
            hit_coords.push_row(&points);
            hit_digits.push_row(&digits);
        }

        log::debug!(
            "Digitized {} track(s) over {} plane(s)",
            hit_coords.rows(),
            self.detector.num_planes()
        );
        Digitization {
            hit_coords,
            hit_digits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use crate::sim::{AcceptancePolicy, TrackCount, TrackSampler};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn detector(depths: &[f64]) -> DetectorConfig {
        DetectorConfig {
            plane_depths: depths.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_quantize_rounds_to_nearest_cell() {
        assert_eq!(quantize(0.0, 125.0), 0);
        assert_eq!(quantize(62.4, 125.0), 0);
        assert_eq!(quantize(62.5, 125.0), 1);
        assert_eq!(quantize(-62.4, 125.0), 0);
        assert_eq!(quantize(-62.6, 125.0), -1);
        assert_eq!(quantize(1499.0, 125.0), 12);
    }

    #[test]
    fn test_quantize_time_keeps_physical_units() {
        assert_eq!(quantize_time(1049.0, 100.0), 1000.0);
        assert_eq!(quantize_time(1050.0, 100.0), 1100.0);
        assert_eq!(quantize_time(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_requantizing_is_stable() {
        for k in -20..20 {
            assert_eq!(quantize(cell_center(k, 125.0), 125.0), k);
            assert_eq!(quantize(cell_center(k, 120.0), 120.0), k);
            let kt = k as f64 * 100.0;
            assert_eq!(quantize_time(kt, 100.0), kt);
        }
    }

    #[test]
    fn test_projection_by_hand() {
        let digitizer = Digitizer::new(detector(&[0.0, 100.0])).unwrap();
        let saeta = Saeta::new(100.0, 0.3, 200.0, 0.4, 1000.0, 2.0);

        let p = digitizer.project(&saeta, 100.0);
        assert!((p.x - 130.0).abs() < 1e-9);
        assert!((p.y - 240.0).abs() < 1e-9);
        // sqrt(1 + 0.09 + 0.16) = sqrt(1.25)
        assert!((p.z - (1000.0 + 1.25f64.sqrt() * 200.0)).abs() < 1e-9);

        let d = digitizer.quantize_point(p);
        assert_eq!(d, DVec3::new(1.0, 2.0, 1200.0));
    }

    #[test]
    fn test_empty_event_gives_empty_matrices() {
        let digitizer = Digitizer::new(DetectorConfig::default()).unwrap();
        let out = digitizer.digitize(&Event::new());
        assert_eq!(out.hit_coords.rows(), 0);
        assert_eq!(out.hit_digits.rows(), 0);
        assert_eq!(out.hit_coords.cols(), 12);
        assert_eq!(out.hit_digits.cols(), 12);
        assert!(out.hit_list().is_empty());
    }

    #[test]
    fn test_reference_plane_returns_origin() {
        let digitizer = Digitizer::new(detector(&[250.0])).unwrap();
        let mut event = Event::new();
        event.add_saeta(Saeta::new(12.5, 0.2, 700.0, -0.1, 1234.5, 3.3));
        event.add_saeta(Saeta::new(900.0, -0.05, 30.0, 0.15, 987.0, 3.3));

        let out = digitizer.digitize(&event);
        for (i, saeta) in event.saetas().enumerate() {
            assert_eq!(out.hit_coords.row(i).unwrap(), &[saeta.x0, saeta.y0, saeta.t0]);
        }
    }

    #[test]
    fn test_vertical_tracks_hit_their_origin() {
        let det = DetectorConfig::default();
        let sampler = TrackSampler::new(
            det.clone(),
            SamplerConfig {
                theta_max_deg: 0.0,
                ..Default::default()
            },
            AcceptancePolicy::ForcedAcceptance {
                target: TrackCount::Fixed(4),
            },
        )
        .unwrap();
        let (event, _) = sampler.generate(&mut Pcg32::seed_from_u64(5)).unwrap();
        let out = Digitizer::new(det).unwrap().digitize(&event);

        for (i, saeta) in event.saetas().enumerate() {
            for plane in 0..out.num_planes() {
                let (point, _) = out.hit(i, plane).unwrap();
                assert_eq!(point.x, saeta.x0);
                assert_eq!(point.y, saeta.y0);
            }
        }
    }

    #[test]
    fn test_hit_list_order() {
        let digitizer = Digitizer::new(detector(&[0.0, 100.0, 200.0])).unwrap();
        let mut event = Event::new();
        event.add_saeta(Saeta::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0));
        event.add_saeta(Saeta::new(250.0, 0.0, 240.0, 0.0, 0.0, 1.0));

        let hits = digitizer.digitize(&event).hit_list();
        assert_eq!(hits.len(), 6);
        assert_eq!(hits[0], [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(hits[2], [2.0, 0.0, 0.0, 200.0]);
        assert_eq!(hits[3], [0.0, 2.0, 2.0, 0.0]);
        assert_eq!(hits[5][0], 2.0);
    }

    #[test]
    fn test_hit_out_of_range() {
        let digitizer = Digitizer::new(detector(&[0.0])).unwrap();
        let mut event = Event::new();
        event.add_saeta(Saeta::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0));
        let out = digitizer.digitize(&event);
        assert!(out.hit(0, 0).is_some());
        assert!(out.hit(0, 1).is_none());
        assert!(out.hit(1, 0).is_none());
        assert_eq!(out.hit_coords.get(0, 3), None);
    }

    #[test]
    #[should_panic(expected = "row width does not match matrix")]
    fn test_push_row_rejects_wrong_width() {
        let mut matrix = HitMatrix::with_capacity(1, 3);
        matrix.push_row(&[1.0, 2.0, 3.0]);
        assert_eq!(matrix.rows(), 1);
        matrix.push_row(&[1.0, 2.0]);
    }

    proptest! {
        #[test]
        fn rows_match_multiplicity(seed in any::<u64>(), n in 0usize..8) {
            let det = DetectorConfig::default();
            let sampler = TrackSampler::new(
                det.clone(),
                SamplerConfig::default(),
                AcceptancePolicy::CappedAttempts { target: TrackCount::Fixed(n) },
            ).unwrap();
            let (event, _) = sampler.generate(&mut Pcg32::seed_from_u64(seed)).unwrap();
            let out = Digitizer::new(det).unwrap().digitize(&event);

            prop_assert_eq!(out.hit_coords.rows(), event.multiplicity());
            prop_assert_eq!(out.hit_digits.rows(), event.multiplicity());
            prop_assert_eq!(out.hit_coords.cols(), 12);
            prop_assert_eq!(out.hit_digits.cols(), 12);
        }

        #[test]
        fn time_is_monotonic_with_depth(
            x0 in 0.0f64..1500.0,
            y0 in 0.0f64..1200.0,
            xp in 0.0f64..1.0,
            yp in 0.0f64..1.0,
            t0 in 0.0f64..2000.0,
            s0 in 0.01f64..10.0,
        ) {
            let digitizer = Digitizer::new(DetectorConfig::default()).unwrap();
            let mut event = Event::new();
            event.add_saeta(Saeta::new(x0, xp, y0, yp, t0, s0));
            let out = digitizer.digitize(&event);

            for plane in 1..out.num_planes() {
                let (prev_p, prev_d) = out.hit(0, plane - 1).unwrap();
                let (p, d) = out.hit(0, plane).unwrap();
                prop_assert!(p.z >= prev_p.z);
                prop_assert!(d.z >= prev_d.z);
            }
        }

        #[test]
        fn cell_quantization_is_idempotent(x in -5000.0f64..5000.0, pitch in 1.0f64..500.0) {
            let k = quantize(x, pitch);
            prop_assert_eq!(quantize(cell_center(k, pitch), pitch), k);
        }
    }
}
