use crate::beam::BeamSource;
use crate::cherenkov::CherenkovEmitter;
use crate::ensemble::Ensemble;
use crate::magnet::MagneticDeflector;
use crate::random::RandomSource;
use crate::scattering::ScatteringModel;
use beamline_common::{BeamlineConfig, BeamlineResult, CherenkovEvent, RunParams};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Progress of one run. Runs only move forward, one stage per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Init,
    Generated,
    Deflected,
    Scattered,
    Emitted,
}

/// Final ensemble and the Cherenkov events derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub final_ensemble: Ensemble,
    pub cherenkov_events: Vec<CherenkovEvent>,
}

/// Runs beam generation, magnetic deflection, foil scattering and Cherenkov
/// emission, in that order, over a single ensemble.
#[derive(Debug, Clone)]
pub struct SimulationPipeline {
    config: BeamlineConfig,
    params: RunParams,
    stage: Stage,
}

impl SimulationPipeline {
    /// Validates the configuration up front; an invalid configuration never
    /// reaches a stage.
    pub fn new(config: BeamlineConfig) -> BeamlineResult<Self> {
        config.validate()?;
        let params = config.get_run_params();
        Ok(Self {
            config,
            params,
            stage: Stage::Init,
        })
    }

    pub fn config(&self) -> &BeamlineConfig {
        &self.config
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    fn advance(&mut self, next: Stage) {
        debug!("Stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    /// Executes all four stages. Consumes the pipeline; a run is never re-entered.
    pub fn run(mut self, rng: &mut RandomSource) -> BeamlineResult<RunOutput> {
        let params = self.params.clone();
        let start_time = Instant::now();
        info!(
            "Running beamline: {} particles, {} GeV, seed {}, {:?} sampling.",
            params.num_particles,
            params.beam_energy_gev,
            rng.seed(),
            rng.mode()
        );
        debug!(
            "Run parameters: E = {:.3e} eV, sigma = {:.3e} m, deflection {:.3e} rad, theta_0 {:.3e} rad.",
            params.beam_energy_ev, params.beam_sigma_m, params.deflection_angle, params.scattering_theta0
        );

        let mut ensemble = BeamSource::from_params(&params).generate(params.num_particles, rng)?;
        self.advance(Stage::Generated);

        MagneticDeflector::from_params(&params).apply(&mut ensemble);
        self.advance(Stage::Deflected);

        ScatteringModel::from_params(&params).apply(&mut ensemble, rng)?;
        self.advance(Stage::Scattered);

        let cherenkov_events = CherenkovEmitter::from_params(&params).emit(&ensemble);
        self.advance(Stage::Emitted);

        info!(
            "Run finished in {:.3} ms: {} particles, {} Cherenkov events.",
            start_time.elapsed().as_secs_f64() * 1000.0,
            ensemble.len(),
            cherenkov_events.len()
        );

        Ok(RunOutput {
            final_ensemble: ensemble,
            cherenkov_events,
        })
    }
}

/// Validates `config` and runs the full pipeline with `rng`.
pub fn run(config: &BeamlineConfig, rng: &mut RandomSource) -> BeamlineResult<RunOutput> {
    SimulationPipeline::new(config.clone())?.run(rng)
}
