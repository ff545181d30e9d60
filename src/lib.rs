//! Turns measured emission spectra and angular profiles into per-event
//! photon initial states: kinetic energy, direction, polarization, and
//! position.

pub mod calibration;
pub mod config;
pub mod direction;
pub mod energy;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod piecewise;
pub mod rand_gen;
pub mod rejection;
pub mod units;
pub mod vec3;
pub mod vertex;

pub use config::{DirectionConfig, EnergyConfig, EngineConfig};
pub use direction::{DirectionSampler, Emission, EmissionLaw};
pub use energy::EnergySampler;
pub use engine::{EmissionRecord, EngineBuilder, PhotonEmissionEngine};
pub use error::{ConfigurationError, SamplingError};
pub use histogram::Histogram;
pub use piecewise::PiecewiseConstantSampler;
pub use rand_gen::RandStream;
pub use rejection::{Acceptance, BoundedRejectionSampler, Gaussian};
pub use vertex::VertexProvider;
