use crate::ensemble::Ensemble;
use beamline_common::{CherenkovEvent, ParticleState, RunParams};
use log::{debug, warn};
use rayon::prelude::*;

/// Closed-form photon count used in place of a Frank-Tamm spectral integral.
///
/// `yield = trunc(100 * (1 - 1 / (v^2 n^2)))`, clamped at zero. The result is
/// always below 100 for a finite velocity.
#[derive(Debug, Clone, Copy)]
pub struct PhotonYieldCalculator {
    refractive_index: f64,
}

impl PhotonYieldCalculator {
    pub const YIELD_SCALE: f64 = 100.0;

    pub fn new(refractive_index: f64) -> Self {
        Self { refractive_index }
    }

    pub fn photon_yield(&self, velocity: f64) -> u32 {
        let n = self.refractive_index;
        let raw = Self::YIELD_SCALE * (1.0 - 1.0 / (velocity * velocity * n * n));
        if raw.is_finite() && raw > 0.0 {
            raw.trunc() as u32
        } else {
            0
        }
    }
}

/// Threshold-based Cherenkov emission in the radiator.
///
/// The velocity is the ratio `|p| / beam_energy`, not a relativistic beta.
/// A particle emits when `cos(theta_c) = 1 / (v n) <= 1`.
#[derive(Debug, Clone, Copy)]
pub struct CherenkovEmitter {
    refractive_index: f64,
    beam_energy: f64,
    yield_calculator: PhotonYieldCalculator,
}

impl CherenkovEmitter {
    pub fn new(refractive_index: f64, beam_energy: f64) -> Self {
        Self {
            refractive_index,
            beam_energy,
            yield_calculator: PhotonYieldCalculator::new(refractive_index),
        }
    }

    pub fn from_params(params: &RunParams) -> Self {
        Self::new(params.refractive_index, params.beam_energy_gev)
    }

    pub fn velocity_proxy(&self, particle: &ParticleState) -> f64 {
        particle.momentum.length() / self.beam_energy
    }

    /// `cos(theta_c)` for the given velocity, or `None` when the velocity is
    /// zero and the angle is undefined.
    pub fn cos_cherenkov_angle(&self, velocity: f64) -> Option<f64> {
        if velocity == 0.0 {
            None
        } else {
            Some(1.0 / (velocity * self.refractive_index))
        }
    }

    /// Event for one particle, if it is above threshold.
    pub fn evaluate(&self, particle: &ParticleState) -> Option<CherenkovEvent> {
        let velocity = self.velocity_proxy(particle);
        let cos_theta_c = self.cos_cherenkov_angle(velocity)?;
        // NaN fails this comparison as well.
        if cos_theta_c <= 1.0 {
            let num_photons = self.yield_calculator.photon_yield(velocity);
            Some(CherenkovEvent::from_particle(particle, num_photons))
        } else {
            None
        }
    }

    /// Events for every particle above threshold, in ensemble order.
    pub fn emit(&self, ensemble: &Ensemble) -> Vec<CherenkovEvent> {
        let events: Vec<CherenkovEvent> = ensemble
            .particles()
            .par_iter()
            .filter_map(|particle| self.evaluate(particle))
            .collect();

        if events.is_empty() && !ensemble.is_empty() {
            warn!(
                "No particle crossed the Cherenkov threshold (n = {}).",
                self.refractive_index
            );
        }
        debug!("{} of {} particles emitted Cherenkov light.", events.len(), ensemble.len());
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_common::Vec3;
    use proptest::prelude::*;

    fn particle_with_momentum(p: Vec3) -> ParticleState {
        ParticleState::new(Vec3::new(0.001, 0.002, 0.0), p)
    }

    #[test]
    fn reference_yield_at_unit_velocity() {
        // 100 * (1 - 1 / 1.46^2) = 53.09...
        assert_eq!(PhotonYieldCalculator::new(1.46).photon_yield(1.0), 53);
    }

    #[test]
    fn yield_clamps_below_threshold() {
        assert_eq!(PhotonYieldCalculator::new(1.46).photon_yield(0.5), 0);
        assert_eq!(PhotonYieldCalculator::new(1.46).photon_yield(0.0), 0);
    }

    #[test]
    fn full_momentum_emits() {
        let emitter = CherenkovEmitter::new(1.46, 1.5);
        let particle = particle_with_momentum(Vec3::new(0.0, 0.0, 1.5));
        let event = emitter.evaluate(&particle).unwrap();
        assert_eq!(event.num_photons, 53);
        assert_eq!(event.position, particle.position);
        assert_eq!(event.momentum, particle.momentum);
        assert_eq!(event.wavelength_range, (200e-9, 600e-9));
    }

    #[test]
    fn below_threshold_does_not_emit() {
        let emitter = CherenkovEmitter::new(1.46, 1.5);
        // v = 0.5, v * n = 0.73 < 1
        let slow = particle_with_momentum(Vec3::new(0.0, 0.0, 0.75));
        assert!(emitter.evaluate(&slow).is_none());
    }

    #[test]
    fn zero_velocity_does_not_emit() {
        let emitter = CherenkovEmitter::new(1.46, 1.5);
        assert!(emitter.cos_cherenkov_angle(0.0).is_none());
        assert!(emitter.evaluate(&particle_with_momentum(Vec3::zero())).is_none());
    }

    #[test]
    fn exactly_at_threshold_emits_zero_photons() {
        let emitter = CherenkovEmitter::new(2.0, 1.0);
        // v = 0.5, v * n = 1
        let event = emitter.evaluate(&particle_with_momentum(Vec3::new(0.0, 0.0, 0.5))).unwrap();
        assert_eq!(event.num_photons, 0);
    }

    #[test]
    fn non_finite_momentum_does_not_emit() {
        let emitter = CherenkovEmitter::new(1.46, 1.5);
        assert!(emitter.evaluate(&particle_with_momentum(Vec3::new(f64::NAN, 0.0, 1.5))).is_none());
    }

    #[test]
    fn emit_keeps_ensemble_order_and_skips_subthreshold() {
        let emitter = CherenkovEmitter::new(1.46, 1.5);
        let ensemble = Ensemble::from_particles(vec![
            ParticleState::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.5)),
            ParticleState::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.1)),
            ParticleState::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 3.0)),
            ParticleState::new(Vec3::new(4.0, 0.0, 0.0), Vec3::zero()),
        ]);
        let events = emitter.emit(&ensemble);
        let xs: Vec<f64> = events.iter().map(|e| e.position.x).collect();
        assert_eq!(xs, vec![1.0, 3.0]);
        // v = 2: 100 * (1 - 1 / (4 * 1.46^2)) = 88.27...
        assert_eq!(events[1].num_photons, 88);
    }

    #[test]
    fn empty_ensemble_gives_no_events() {
        let emitter = CherenkovEmitter::new(1.46, 1.5);
        assert!(emitter.emit(&Ensemble::default()).is_empty());
    }

    proptest! {
        #[test]
        fn photon_counts_in_range(
            px in -3.0f64..3.0,
            py in -3.0f64..3.0,
            pz in -3.0f64..3.0,
            n in 1.0001f64..3.0,
        ) {
            let emitter = CherenkovEmitter::new(n, 1.5);
            let particle = particle_with_momentum(Vec3::new(px, py, pz));
            let velocity = emitter.velocity_proxy(&particle);
            match emitter.evaluate(&particle) {
                Some(event) => {
                    prop_assert!(velocity * n >= 1.0);
                    prop_assert!(event.num_photons < 100);
                }
                None => {
                    prop_assert!(velocity == 0.0 || velocity * n < 1.0);
                }
            }
        }
    }
}
