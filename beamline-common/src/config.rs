use crate::error::{BeamlineError, BeamlineResult};
use crate::run_params::{deflection_angle, highland_theta0, RunParams};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Beam parameters
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct BeamConfig {
    pub energy_gev: f64,
    pub radius_m: f64,
    pub num_particles: usize,
}

impl Default for BeamConfig {
    fn default() -> Self {
        BeamConfig {
            energy_gev: 1.5,
            radius_m: 0.01,
            num_particles: 10_000,
        }
    }
}

// Steering / filtering magnet
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct MagnetConfig {
    pub field_strength_t: f64,
    /// Particle charge in units of e. Positrons are +1.
    pub charge: f64,
}

impl Default for MagnetConfig {
    fn default() -> Self {
        MagnetConfig {
            field_strength_t: 0.5,
            charge: 1.0,
        }
    }
}

// Scattering foil (aluminium in the reference setup)
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct FoilConfig {
    pub thickness_m: f64,
}

impl Default for FoilConfig {
    fn default() -> Self {
        FoilConfig { thickness_m: 0.5e-3 }
    }
}

// Cherenkov radiator (quartz fibers)
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct RadiatorConfig {
    pub refractive_index: f64,
    /// Carried through for downstream tools; no stage reads it.
    pub radiation_length_m: f64,
}

impl Default for RadiatorConfig {
    fn default() -> Self {
        RadiatorConfig {
            refractive_index: 1.46,
            radiation_length_m: 0.12,
        }
    }
}

/// Hodoscope and SiPM parameters.
///
/// These are carried through to output so detector-response tools can pick
/// them up, but the transport pipeline never reads them.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DetectorConfig {
    pub hodoscope_layers: u32,
    pub fiber_diameter_m: f64,
    pub fiber_length_m: f64,
    pub sipm_efficiency: f64,
    pub sipm_dark_count_hz: f64,
    pub sipm_gain: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            hodoscope_layers: 4,
            fiber_diameter_m: 0.5e-3,
            fiber_length_m: 0.15,
            sipm_efficiency: 0.35,
            sipm_dark_count_hz: 100.0,
            sipm_gain: 1e6,
        }
    }
}

/// How stochastic stages consume random numbers.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One shared stream, consumed in ensemble index order.
    #[default]
    Sequential,
    /// Rayon worker pool; every particle gets its own indexed stream.
    Parallel,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub seed: Option<u64>,
    pub execution: ExecutionMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            seed: Some(42),
            execution: ExecutionMode::Sequential,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Bincode,
    MessagePack,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
            OutputFormat::MessagePack => "msgpack",
        }
    }
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_events: bool,
    pub save_final_ensemble: bool,
    pub save_summary: bool,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: "beamline".to_string(),
            save_events: true,
            save_final_ensemble: true,
            save_summary: true,
            format: OutputFormat::Json,
        }
    }
}

/// Main simulation configuration, loaded from a TOML file.
/// Every section is optional; missing sections take the reference values.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct BeamlineConfig {
    pub beam: BeamConfig,
    pub magnet: MagnetConfig,
    pub foil: FoilConfig,
    pub radiator: RadiatorConfig,
    pub detector: DetectorConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

impl BeamlineConfig {
    /// Loads and validates the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file '{}'", path_ref.display()))?;
        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to load config from '{}'", path_ref.display()))?;

        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: BeamlineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values every stage depends on. Runs before any stage so a
    /// bad configuration never produces a partial ensemble.
    pub fn validate(&self) -> BeamlineResult<()> {
        let beam = &self.beam;
        if !beam.energy_gev.is_finite() || beam.energy_gev <= 0.0 {
            return Err(BeamlineError::invalid(format!(
                "beam energy must be positive, got {} GeV",
                beam.energy_gev
            )));
        }
        if !beam.radius_m.is_finite() || beam.radius_m < 0.0 {
            return Err(BeamlineError::invalid(format!(
                "beam radius must be non-negative, got {} m",
                beam.radius_m
            )));
        }
        if !self.magnet.field_strength_t.is_finite() || !self.magnet.charge.is_finite() {
            return Err(BeamlineError::invalid("magnetic field and charge must be finite"));
        }
        if !self.foil.thickness_m.is_finite() || self.foil.thickness_m < 0.0 {
            return Err(BeamlineError::invalid(format!(
                "foil thickness must be non-negative, got {} m",
                self.foil.thickness_m
            )));
        }
        let n = self.radiator.refractive_index;
        if !n.is_finite() || n <= 1.0 {
            return Err(BeamlineError::invalid(format!(
                "refractive index must be greater than 1, got {}",
                n
            )));
        }
        // Tiny energies pass the checks above but overflow the derived angles.
        let angle = deflection_angle(self.magnet.charge, self.magnet.field_strength_t, beam.energy_gev);
        let theta0 = highland_theta0(beam.energy_gev, self.foil.thickness_m);
        if !angle.is_finite() || !theta0.is_finite() {
            return Err(BeamlineError::invalid(format!(
                "beam energy {} GeV gives a non-finite deflection ({}) or scattering width ({})",
                beam.energy_gev, angle, theta0
            )));
        }
        Ok(())
    }

    /// Seed for this run; the reference seed is used when none is configured.
    pub fn seed(&self) -> u64 {
        self.run.seed.unwrap_or(42)
    }

    /// Converts the configuration into the derived parameters used by the stages.
    pub fn get_run_params(&self) -> RunParams {
        RunParams::from_config(self)
    }
}
