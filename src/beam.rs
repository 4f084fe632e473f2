use crate::ensemble::Ensemble;
use crate::random::{RandomSource, StreamStage};
use beamline_common::run_params::BEAM_RADIUS_SIGMAS;
use beamline_common::{BeamlineError, BeamlineResult, ExecutionMode, ParticleState, RunParams, Vec3};
use log::debug;
use rand::Rng;
use rand_distr::Normal;
use rayon::prelude::*;

/// Produces the initial, monoenergetic positron ensemble.
///
/// Transverse positions are Gaussian with sigma = radius / 3, every particle
/// starts at z = 0 travelling along +z with momentum equal to the beam energy.
#[derive(Debug, Clone, Copy)]
pub struct BeamSource {
    sigma: f64,
    beam_energy: f64,
}

impl BeamSource {
    pub fn new(beam_radius: f64, beam_energy: f64) -> Self {
        Self {
            sigma: beam_radius / BEAM_RADIUS_SIGMAS,
            beam_energy,
        }
    }

    pub fn from_params(params: &RunParams) -> Self {
        Self {
            sigma: params.beam_sigma_m,
            beam_energy: params.beam_energy_gev,
        }
    }

    /// Transverse standard deviation in metres.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Generates `n` particles. `n == 0` yields an empty ensemble.
    pub fn generate(&self, n: usize, rng: &mut RandomSource) -> BeamlineResult<Ensemble> {
        let sigma = self.sigma;
        // rand_distr only rejects a non-finite sigma.
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(BeamlineError::Distribution(format!(
                "beam profile sigma must be finite and non-negative, got {}",
                sigma
            )));
        }
        let spread = Normal::new(0.0, sigma)
            .map_err(|e| BeamlineError::Distribution(format!("beam profile (sigma {}): {}", sigma, e)))?;
        let momentum = Vec3::new(0.0, 0.0, self.beam_energy);

        let particles: Vec<ParticleState> = match rng.mode() {
            ExecutionMode::Sequential => {
                // All x offsets first, then all y offsets.
                let shared = rng.shared();
                let xs: Vec<f64> = (0..n).map(|_| shared.sample(&spread)).collect();
                let ys: Vec<f64> = (0..n).map(|_| shared.sample(&spread)).collect();
                xs.into_iter()
                    .zip(ys)
                    .map(|(x, y)| ParticleState::new(Vec3::new(x, y, 0.0), momentum))
                    .collect()
            }
            ExecutionMode::Parallel => {
                let source = &*rng;
                (0..n)
                    .into_par_iter()
                    .map(|idx| {
                        let mut stream = source.particle_stream(StreamStage::Beam, idx);
                        let x = stream.sample(&spread);
                        let y = stream.sample(&spread);
                        ParticleState::new(Vec3::new(x, y, 0.0), momentum)
                    })
                    .collect()
            }
        };

        debug!("Generated {} particles (sigma {:.3e} m, pz {} GeV).", particles.len(), sigma, self.beam_energy);
        Ok(Ensemble::from_particles(particles))
    }
}
