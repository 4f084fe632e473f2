use crate::vecmath::Vec3;
use serde::{Deserialize, Serialize};

/// Wavelength window (meters) attached to every Cherenkov event: UV to visible.
pub const WAVELENGTH_RANGE_M: (f64, f64) = (200e-9, 600e-9);

/// Phase-space state of one simulated positron.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    /// Position in meters.
    pub position: Vec3,
    /// Momentum in GeV, used directly as a momentum proxy.
    pub momentum: Vec3,
}

impl ParticleState {
    pub fn new(position: Vec3, momentum: Vec3) -> Self {
        Self { position, momentum }
    }

    /// Flattens the state into `[x, y, z, px, py, pz]`.
    pub fn to_row(&self) -> [f64; 6] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.momentum.x,
            self.momentum.y,
            self.momentum.z,
        ]
    }

    pub fn from_row(row: [f64; 6]) -> Self {
        Self {
            position: Vec3::new(row[0], row[1], row[2]),
            momentum: Vec3::new(row[3], row[4], row[5]),
        }
    }
}

/// A particle that crossed the Cherenkov threshold in the radiator.
///
/// Holds copies of the particle's position and momentum at emission time,
/// not a reference back into the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CherenkovEvent {
    pub position: Vec3,
    pub momentum: Vec3,
    pub num_photons: u32,
    /// (min, max) wavelength in meters.
    pub wavelength_range: (f64, f64),
}

impl CherenkovEvent {
    pub fn from_particle(particle: &ParticleState, num_photons: u32) -> Self {
        Self {
            position: particle.position,
            momentum: particle.momentum,
            num_photons,
            wavelength_range: WAVELENGTH_RANGE_M,
        }
    }
}
