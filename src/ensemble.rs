use beamline_common::ParticleState;
use serde::{Deserialize, Serialize};

/// Ordered, fixed-size set of particles processed together in one run.
///
/// Stages transform the particles in place; the length and ordering never
/// change, so index `i` names the same particle from generation to emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    particles: Vec<ParticleState>,
}

impl Ensemble {
    pub fn from_particles(particles: Vec<ParticleState>) -> Self {
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[ParticleState] {
        &self.particles
    }

    /// Mutable access for stages. Slices cannot grow or shrink.
    pub fn particles_mut(&mut self) -> &mut [ParticleState] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParticleState> {
        self.particles.iter()
    }

    /// `[x, y, z, px, py, pz]` rows, in ensemble order.
    pub fn to_rows(&self) -> Vec<[f64; 6]> {
        self.particles.iter().map(ParticleState::to_row).collect()
    }
}
