pub mod config;
pub mod error;
pub mod particle;
pub mod run_params;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    BeamConfig, BeamlineConfig, DetectorConfig, ExecutionMode, FoilConfig, MagnetConfig,
    OutputConfig, OutputFormat, RadiatorConfig, RunConfig,
};
pub use error::{BeamlineError, BeamlineResult};
pub use particle::{CherenkovEvent, ParticleState, WAVELENGTH_RANGE_M};
pub use run_params::RunParams;
pub use vecmath::{Mat3, Vec3};
