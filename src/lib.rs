//! Monte Carlo transport of a positron beam through a detector beamline:
//! Gaussian beam generation, magnetic deflection, multiple Coulomb
//! scattering in a foil and Cherenkov photon generation in a radiator.

pub mod beam;
pub mod cherenkov;
pub mod ensemble;
pub mod magnet;
pub mod output;
pub mod pipeline;
pub mod random;
pub mod scattering;
pub mod summary;

pub use beam::BeamSource;
pub use cherenkov::{CherenkovEmitter, PhotonYieldCalculator};
pub use ensemble::Ensemble;
pub use magnet::MagneticDeflector;
pub use pipeline::{run, RunOutput, SimulationPipeline, Stage};
pub use random::{RandomSource, StreamStage};
pub use scattering::ScatteringModel;
pub use summary::{BeamSpot, PhotonHistogram, RunSummary};
