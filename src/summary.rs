use crate::pipeline::RunOutput;
use beamline_common::{BeamlineConfig, DetectorConfig, ExecutionMode};
use log::info;
use serde::{Deserialize, Serialize};

/// Bin count of the photon-yield histogram.
pub const PHOTON_HISTOGRAM_BINS: usize = 30;

/// Equal-width histogram of photon counts per event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotonHistogram {
    /// `counts.len() + 1` edges, or empty when there were no events.
    pub bin_edges: Vec<f64>,
    pub counts: Vec<u32>,
}

impl PhotonHistogram {
    /// Bins span `[min, max]` of the data; the last bin is closed on the right.
    /// When every value is identical a single bin of width one holds them all.
    pub fn from_values(values: &[u32], bins: usize) -> Self {
        let (min, max) = match (values.iter().min(), values.iter().max()) {
            (Some(&min), Some(&max)) if bins > 0 => (min as f64, max as f64),
            _ => return Self::default(),
        };

        if min == max {
            return Self {
                bin_edges: vec![min - 0.5, max + 0.5],
                counts: vec![values.len() as u32],
            };
        }

        let width = (max - min) / bins as f64;
        let bin_edges = (0..=bins).map(|i| min + i as f64 * width).collect();
        let mut counts = vec![0u32; bins];
        for &value in values {
            let idx = (((value as f64 - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { bin_edges, counts }
    }
}

/// Mean and standard deviation of the transverse positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamSpot {
    pub mean_x_m: f64,
    pub mean_y_m: f64,
    pub sigma_x_m: f64,
    pub sigma_y_m: f64,
}

/// Aggregate numbers for one run, for logging and for reporting tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub execution: ExecutionMode,
    pub num_particles: usize,
    pub num_events: usize,
    pub total_photons: u64,
    pub mean_photons: f64,
    pub photon_histogram: PhotonHistogram,
    pub beam_spot: BeamSpot,
    /// Mean angle between the final momenta and the beam axis.
    pub mean_polar_angle_rad: f64,
    /// Detector parameters, passed through untouched.
    pub detector: DetectorConfig,
}

impl RunSummary {
    pub fn from_run(output: &RunOutput, config: &BeamlineConfig) -> Self {
        let ensemble = &output.final_ensemble;
        let events = &output.cherenkov_events;
        let n = ensemble.len();

        let beam_spot = if n > 0 {
            let inv_n = 1.0 / n as f64;
            let mean_x = ensemble.iter().map(|p| p.position.x).sum::<f64>() * inv_n;
            let mean_y = ensemble.iter().map(|p| p.position.y).sum::<f64>() * inv_n;
            let var_x = ensemble.iter().map(|p| (p.position.x - mean_x).powi(2)).sum::<f64>() * inv_n;
            let var_y = ensemble.iter().map(|p| (p.position.y - mean_y).powi(2)).sum::<f64>() * inv_n;
            BeamSpot {
                mean_x_m: mean_x,
                mean_y_m: mean_y,
                sigma_x_m: var_x.sqrt(),
                sigma_y_m: var_y.sqrt(),
            }
        } else {
            BeamSpot::default()
        };

        let mean_polar_angle_rad = if n > 0 {
            ensemble.iter().map(|p| p.momentum.polar_angle()).sum::<f64>() / n as f64
        } else {
            0.0
        };

        let photon_counts: Vec<u32> = events.iter().map(|e| e.num_photons).collect();
        let total_photons: u64 = photon_counts.iter().map(|&c| c as u64).sum();
        let mean_photons = if events.is_empty() {
            0.0
        } else {
            total_photons as f64 / events.len() as f64
        };

        RunSummary {
            seed: config.seed(),
            execution: config.run.execution,
            num_particles: n,
            num_events: events.len(),
            total_photons,
            mean_photons,
            photon_histogram: PhotonHistogram::from_values(&photon_counts, PHOTON_HISTOGRAM_BINS),
            beam_spot,
            mean_polar_angle_rad,
            detector: config.detector.clone(),
        }
    }

    pub fn log(&self) {
        info!(
            "Summary: {} particles | {} Cherenkov events | {} photons (mean {:.2}/event)",
            self.num_particles, self.num_events, self.total_photons, self.mean_photons
        );
        info!(
            "Beam spot: x = {:.3e} +/- {:.3e} m, y = {:.3e} +/- {:.3e} m | mean polar angle {:.3e} rad",
            self.beam_spot.mean_x_m,
            self.beam_spot.sigma_x_m,
            self.beam_spot.mean_y_m,
            self.beam_spot.sigma_y_m,
            self.mean_polar_angle_rad
        );
    }
}
