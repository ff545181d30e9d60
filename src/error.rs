use thiserror::Error;

/// Malformed calibration data or incomplete engine configuration.
///
/// Always fatal: an engine is never built from data that fails these
/// checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("histogram needs edges.len() == weights.len() + 1, got {edges} edges and {weights} weights")]
    SizeMismatch { edges: usize, weights: usize },

    #[error("histogram needs at least 2 edges, got {0}")]
    TooFewEdges(usize),

    #[error("edge {index} is not finite ({value})")]
    NonFiniteEdge { index: usize, value: f64 },

    #[error("edges must be strictly increasing: edge {index} ({value}) does not exceed edge {} ({previous})", .index - 1)]
    NonIncreasingEdges {
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("weight {index} must be a non-negative number, got {value}")]
    NegativeWeight { index: usize, value: f64 },

    #[error("wavelength {index} must be positive, got {value} nm")]
    NonPositiveWavelength { index: usize, value: f64 },

    #[error("histogram over [{low}, {high}) has zero total mass")]
    ZeroMass { low: f64, high: f64 },

    #[error("polar angle table spans [{low}, {high}] rad, outside [0, pi]")]
    PolarAngleOutOfRange { low: f64, high: f64 },

    #[error("standard deviation must be positive and finite, got {0}")]
    InvalidSpread(f64),

    #[error("mean must be finite, got {0}")]
    InvalidMean(f64),

    #[error("photon energy must be positive and finite, got {0} eV")]
    InvalidEnergy(f64),

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("{0} vector must be non-zero and finite")]
    ZeroVector(&'static str),

    #[error("emission engine has no {0} sampler")]
    MissingSampler(&'static str),

    #[error("invalid configuration document: {0}")]
    Document(String),
}

/// A per-call sampling failure. Recoverable: the caller decides whether
/// to drop the event, retry, or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("no acceptable draw from N(mean = {mean}, sigma = {std_dev}) after {attempts} attempts")]
    Exhausted {
        mean: f64,
        std_dev: f64,
        attempts: u32,
    },
}
