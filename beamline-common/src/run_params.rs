use crate::config::{BeamlineConfig, ExecutionMode};
use serde::{Deserialize, Serialize};

/// GeV to eV.
pub const GEV_TO_EV: f64 = 1e9;

/// Highland formula prefactor (13.6 MeV, expressed in GeV).
pub const HIGHLAND_PREFACTOR: f64 = 13.6e-3;

/// Radiation-length normalization used under the Highland square root for the foil.
pub const FOIL_RADIATION_NORM: f64 = 9.37 * 0.027;

/// Beam sigma is the configured radius divided by this.
pub const BEAM_RADIUS_SIGMAS: f64 = 3.0;

/// Magnet bending angle, `charge * B / (E * 1e9)`.
pub fn deflection_angle(charge: f64, field_strength: f64, beam_energy_gev: f64) -> f64 {
    (charge * field_strength) / (beam_energy_gev * GEV_TO_EV)
}

/// Highland width theta_0 for a foil of the given thickness.
pub fn highland_theta0(beam_energy_gev: f64, foil_thickness: f64) -> f64 {
    HIGHLAND_PREFACTOR / (beam_energy_gev * GEV_TO_EV) * (foil_thickness / FOIL_RADIATION_NORM).sqrt()
}

/// Values derived from the configuration, computed once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    pub num_particles: usize,
    pub beam_energy_gev: f64,
    pub beam_energy_ev: f64,
    pub beam_sigma_m: f64,
    pub deflection_angle: f64,
    pub scattering_theta0: f64,
    pub refractive_index: f64,
    pub seed: u64,
    pub execution: ExecutionMode,
}

impl RunParams {
    pub fn from_config(config: &BeamlineConfig) -> Self {
        let energy = config.beam.energy_gev;
        RunParams {
            num_particles: config.beam.num_particles,
            beam_energy_gev: energy,
            beam_energy_ev: energy * GEV_TO_EV,
            beam_sigma_m: config.beam.radius_m / BEAM_RADIUS_SIGMAS,
            deflection_angle: deflection_angle(
                config.magnet.charge,
                config.magnet.field_strength_t,
                energy,
            ),
            scattering_theta0: highland_theta0(energy, config.foil.thickness_m),
            refractive_index: config.radiator.refractive_index,
            seed: config.seed(),
            execution: config.run.execution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_values() {
        let params = BeamlineConfig::default().get_run_params();
        assert_eq!(params.beam_energy_ev, 1.5e9);
        assert!((params.beam_sigma_m - 0.01 / 3.0).abs() < 1e-15);
        assert!((params.deflection_angle - 0.5 / 1.5e9).abs() < 1e-24);
        let expected = 13.6e-3 / 1.5e9 * (0.5e-3f64 / (9.37 * 0.027)).sqrt();
        assert!((params.scattering_theta0 - expected).abs() < 1e-24);
    }

    #[test]
    fn zero_thickness_gives_zero_width() {
        assert_eq!(highland_theta0(1.5, 0.0), 0.0);
    }
}
