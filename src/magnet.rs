use crate::ensemble::Ensemble;
use beamline_common::run_params::deflection_angle;
use beamline_common::{Mat3, RunParams};
use log::debug;
use rayon::prelude::*;

/// Positron charge in units of e.
pub const POSITRON_CHARGE: f64 = 1.0;

/// Beam-wide steering magnet in the small-angle Lorentz-force approximation.
///
/// Every momentum is rotated about the z axis by the same angle
/// `charge * B / (E * 1e9)`. Positions are not touched.
#[derive(Debug, Clone, Copy)]
pub struct MagneticDeflector {
    angle: f64,
    rotation: Mat3,
}

impl MagneticDeflector {
    /// Deflector for a positron in `field_strength` Tesla at `beam_energy` GeV.
    pub fn new(field_strength: f64, beam_energy: f64) -> Self {
        Self::with_charge(POSITRON_CHARGE, field_strength, beam_energy)
    }

    pub fn with_charge(charge: f64, field_strength: f64, beam_energy: f64) -> Self {
        Self::from_angle(deflection_angle(charge, field_strength, beam_energy))
    }

    pub fn from_angle(angle: f64) -> Self {
        Self {
            angle,
            rotation: Mat3::rotation_z(angle),
        }
    }

    pub fn from_params(params: &RunParams) -> Self {
        Self::from_angle(params.deflection_angle)
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn apply(&self, ensemble: &mut Ensemble) {
        let rotation = self.rotation;
        ensemble
            .particles_mut()
            .par_iter_mut()
            .for_each(|particle| particle.momentum = rotation.mul_vec(particle.momentum));
        debug!("Deflected {} particles by {:.3e} rad.", ensemble.len(), self.angle);
    }
}
