use crate::ensemble::Ensemble;
use crate::random::{RandomSource, StreamStage};
use beamline_common::run_params::highland_theta0;
use beamline_common::{BeamlineError, BeamlineResult, ExecutionMode, Mat3, RunParams, Vec3};
use log::{debug, trace};
use rand::distr::Uniform;
use rand::Rng;
use rand_distr::Normal;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Multiple Coulomb scattering in a thin foil.
///
/// Each particle draws a polar kick `theta ~ N(0, theta_0)` and an azimuth
/// `phi ~ U(0, 2pi)`. The momentum is rotated about x by `theta`, then about
/// z by `phi`. `theta_0` comes from the Highland approximation.
#[derive(Debug, Clone, Copy)]
pub struct ScatteringModel {
    theta0: f64,
}

impl ScatteringModel {
    pub fn new(beam_energy: f64, foil_thickness: f64) -> Self {
        Self {
            theta0: highland_theta0(beam_energy, foil_thickness),
        }
    }

    pub fn from_params(params: &RunParams) -> Self {
        Self {
            theta0: params.scattering_theta0,
        }
    }

    /// Characteristic scattering width in radians.
    pub fn theta0(&self) -> f64 {
        self.theta0
    }

    pub fn apply(&self, ensemble: &mut Ensemble, rng: &mut RandomSource) -> BeamlineResult<()> {
        if !(self.theta0 >= 0.0 && self.theta0.is_finite()) {
            return Err(BeamlineError::Distribution(format!(
                "scattering width must be finite and non-negative, got {}",
                self.theta0
            )));
        }
        let polar = Normal::new(0.0, self.theta0)
            .map_err(|e| BeamlineError::Distribution(format!("scattering width {}: {}", self.theta0, e)))?;
        let azimuth = Uniform::new(0.0, 2.0 * PI)
            .map_err(|e| BeamlineError::Distribution(format!("azimuth: {}", e)))?;

        match rng.mode() {
            ExecutionMode::Sequential => {
                let shared = rng.shared();
                for (idx, particle) in ensemble.particles_mut().iter_mut().enumerate() {
                    let theta = shared.sample(&polar);
                    let phi = shared.sample(&azimuth);
                    trace!("Particle {}: theta {:.3e}, phi {:.3}", idx, theta, phi);
                    particle.momentum = scatter(particle.momentum, theta, phi);
                }
            }
            ExecutionMode::Parallel => {
                let source = &*rng;
                ensemble
                    .particles_mut()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(idx, particle)| {
                        let mut stream = source.particle_stream(StreamStage::Scattering, idx);
                        let theta = stream.sample(&polar);
                        let phi = stream.sample(&azimuth);
                        particle.momentum = scatter(particle.momentum, theta, phi);
                    });
            }
        }

        debug!("Scattered {} particles (theta_0 {:.3e} rad).", ensemble.len(), self.theta0);
        Ok(())
    }
}

/// `Rz(phi) * Rx(theta) * momentum`.
fn scatter(momentum: Vec3, theta: f64, phi: f64) -> Vec3 {
    Mat3::rotation_z(phi)
        .mul_mat(&Mat3::rotation_x(theta))
        .mul_vec(momentum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_common::ParticleState;

    fn along_z(n: usize, pz: f64) -> Ensemble {
        Ensemble::from_particles(
            (0..n)
                .map(|i| ParticleState::new(Vec3::new(i as f64 * 1e-3, 0.0, 0.0), Vec3::new(0.0, 0.0, pz)))
                .collect(),
        )
    }

    #[test]
    fn highland_width_reference() {
        let model = ScatteringModel::new(1.5, 0.5e-3);
        let expected = 13.6e-3 / 1.5e9 * (0.5e-3f64 / (9.37 * 0.027)).sqrt();
        assert!((model.theta0() - expected).abs() < 1e-24);
    }

    #[test]
    fn x_rotation_applies_before_z_rotation() {
        let p = scatter(Vec3::new(0.0, 0.0, 1.0), std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2);
        // Rx(pi/2) takes +z to -y, Rz(pi/2) then takes -y to +x.
        assert!((p - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn zero_thickness_leaves_axial_momentum_alone() {
        let mut ensemble = along_z(100, 1.5);
        let before = ensemble.clone();
        ScatteringModel::new(1.5, 0.0)
            .apply(&mut ensemble, &mut RandomSource::sequential(42))
            .unwrap();
        for (a, b) in before.iter().zip(ensemble.iter()) {
            assert_eq!(a.position, b.position);
            assert!((a.momentum - b.momentum).length() < 1e-12);
        }
    }

    #[test]
    fn zero_thickness_keeps_polar_angle_of_tilted_momenta() {
        let tilted = ParticleState::new(Vec3::zero(), Vec3::new(0.2, 0.1, 1.4));
        let mut ensemble = Ensemble::from_particles(vec![tilted; 50]);
        ScatteringModel::new(1.5, 0.0)
            .apply(&mut ensemble, &mut RandomSource::sequential(3))
            .unwrap();
        for p in ensemble.iter() {
            assert!((p.momentum.polar_angle() - tilted.momentum.polar_angle()).abs() < 1e-12);
            assert!((p.momentum.length() - tilted.momentum.length()).abs() < 1e-12);
        }
    }

    #[test]
    fn scattering_preserves_positions_and_momentum_magnitude() {
        let mut ensemble = along_z(200, 1.5);
        let before = ensemble.clone();
        ScatteringModel::new(1.5, 0.5e-3)
            .apply(&mut ensemble, &mut RandomSource::sequential(42))
            .unwrap();
        assert_eq!(ensemble.len(), before.len());
        for (a, b) in before.iter().zip(ensemble.iter()) {
            assert_eq!(a.position, b.position);
            assert!((a.momentum.length() - b.momentum.length()).abs() < 1e-12);
        }
    }

    #[test]
    fn kick_spread_tracks_theta0() {
        // A very low energy makes theta_0 large enough to measure.
        let model = ScatteringModel::new(2e-11, 0.5e-3);
        let theta0 = model.theta0();
        assert!(theta0 > 0.01 && theta0 < 0.1, "theta0 {}", theta0);

        let n = 20_000;
        let mut ensemble = along_z(n, 1.0);
        model.apply(&mut ensemble, &mut RandomSource::sequential(11)).unwrap();
        // Polar angle equals |theta| for momenta along z; E[theta^2] = theta0^2.
        let mean_sq = ensemble.iter().map(|p| p.momentum.polar_angle().powi(2)).sum::<f64>() / n as f64;
        assert!((mean_sq.sqrt() / theta0 - 1.0).abs() < 0.05);
    }

    #[test]
    fn unusable_width_is_a_distribution_error() {
        let mut ensemble = along_z(10, 1.5);
        let before = ensemble.clone();
        for model in [ScatteringModel::new(1.5, -1e-3), ScatteringModel::new(1e-320, 0.5e-3)] {
            let result = model.apply(&mut ensemble, &mut RandomSource::sequential(42));
            assert!(matches!(result, Err(BeamlineError::Distribution(_))));
        }
        assert_eq!(ensemble, before);
    }

    #[test]
    fn parallel_mode_is_reproducible() {
        let model = ScatteringModel::new(2e-11, 0.5e-3);
        let mut a = along_z(1000, 1.0);
        let mut b = along_z(1000, 1.0);
        model.apply(&mut a, &mut RandomSource::parallel(5)).unwrap();
        model.apply(&mut b, &mut RandomSource::parallel(5)).unwrap();
        assert_eq!(a, b);
    }
}
