//! Declarative engine configuration, loadable from JSON.
//!
//! ```json
//! {
//!   "seed": 1234,
//!   "region": "LED",
//!   "energy": { "type": "gaussian_wavelength", "mean_nm": 450, "sigma_nm": 10, "max_attempts": 3 },
//!   "direction": { "type": "lambertian", "normal": [0, 0, 1] }
//! }
//! ```
//!
//! Every key is optional; missing ones take the [EngineConfig::default]
//! values. Without a seed, engines are seeded from system entropy.

use json::JsonValue;

use crate::calibration;
use crate::direction::DirectionSampler;
use crate::energy::EnergySampler;
use crate::engine::PhotonEmissionEngine;
use crate::error::ConfigurationError;
use crate::histogram::Histogram;
use crate::rand_gen::RandStream;
use crate::rejection::DEFAULT_MAX_ATTEMPTS;
use crate::vec3::Vector;
use crate::vertex::VertexProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum EnergyConfig {
    Monoenergetic {
        energy_ev: f64,
    },
    /// Spectrum authored over wavelength, longest wavelength first.
    WavelengthSpectrum {
        wavelength_nm: Vec<f64>,
        weights: Vec<f64>,
    },
    EnergySpectrum {
        energy_ev: Vec<f64>,
        weights: Vec<f64>,
    },
    GaussianWavelength {
        mean_nm: f64,
        sigma_nm: f64,
        max_attempts: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectionConfig {
    Lambertian {
        normal: [f64; 3],
    },
    TabulatedPolar {
        angle_deg: Vec<f64>,
        weights: Vec<f64>,
        axis: [f64; 3],
    },
    Fixed {
        direction: [f64; 3],
    },
    Isotropic,
}

/// Everything needed to build a [PhotonEmissionEngine], resolved before
/// the first event.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Master seed; each worker derives its own stream from it.
    pub seed: Option<u64>,
    /// Region label passed to the vertex provider.
    pub region: String,
    pub energy: EnergyConfig,
    pub direction: DirectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            region: "source".to_string(),
            energy: EnergyConfig::WavelengthSpectrum {
                wavelength_nm: calibration::BLUE_LED_WAVELENGTH_NM.to_vec(),
                weights: calibration::BLUE_LED_INTENSITY.to_vec(),
            },
            direction: DirectionConfig::TabulatedPolar {
                angle_deg: calibration::LED_ANGLE_DEG.to_vec(),
                weights: calibration::LED_ANGULAR_INTENSITY.to_vec(),
                axis: [0.0, 0.0, 1.0],
            },
        }
    }
}

impl EnergyConfig {
    pub fn build(&self, stream: RandStream) -> Result<EnergySampler, ConfigurationError> {
        match self {
            EnergyConfig::Monoenergetic { energy_ev } => EnergySampler::monoenergetic(*energy_ev),
            EnergyConfig::WavelengthSpectrum {
                wavelength_nm,
                weights,
            } => EnergySampler::spectrum(
                Histogram::from_wavelength_table(wavelength_nm, weights)?,
                stream,
            ),
            EnergyConfig::EnergySpectrum { energy_ev, weights } => {
                EnergySampler::spectrum(Histogram::new(energy_ev.clone(), weights.clone())?, stream)
            }
            EnergyConfig::GaussianWavelength {
                mean_nm,
                sigma_nm,
                max_attempts,
            } => EnergySampler::gaussian_wavelength(*mean_nm, *sigma_nm, *max_attempts, stream),
        }
    }

    fn from_json(value: &JsonValue) -> Result<Self, ConfigurationError> {
        match kind(value, "energy")? {
            "monoenergetic" => Ok(EnergyConfig::Monoenergetic {
                energy_ev: number(value, "energy_ev")?,
            }),
            "wavelength_spectrum" => Ok(EnergyConfig::WavelengthSpectrum {
                wavelength_nm: numbers(value, "wavelength_nm")?,
                weights: numbers(value, "weights")?,
            }),
            "energy_spectrum" => Ok(EnergyConfig::EnergySpectrum {
                energy_ev: numbers(value, "energy_ev")?,
                weights: numbers(value, "weights")?,
            }),
            "gaussian_wavelength" => Ok(EnergyConfig::GaussianWavelength {
                mean_nm: number(value, "mean_nm")?,
                sigma_nm: number(value, "sigma_nm")?,
                max_attempts: match &value["max_attempts"] {
                    JsonValue::Null => DEFAULT_MAX_ATTEMPTS,
                    v => v.as_u32().ok_or_else(|| invalid("max_attempts", "an unsigned integer"))?,
                },
            }),
            other => Err(ConfigurationError::Document(format!(
                "unknown energy type {:?}",
                other
            ))),
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            EnergyConfig::Monoenergetic { energy_ev } => json::object! {
                "type" => "monoenergetic",
                "energy_ev" => *energy_ev,
            },
            EnergyConfig::WavelengthSpectrum {
                wavelength_nm,
                weights,
            } => json::object! {
                "type" => "wavelength_spectrum",
                "wavelength_nm" => wavelength_nm.clone(),
                "weights" => weights.clone(),
            },
            EnergyConfig::EnergySpectrum { energy_ev, weights } => json::object! {
                "type" => "energy_spectrum",
                "energy_ev" => energy_ev.clone(),
                "weights" => weights.clone(),
            },
            EnergyConfig::GaussianWavelength {
                mean_nm,
                sigma_nm,
                max_attempts,
            } => json::object! {
                "type" => "gaussian_wavelength",
                "mean_nm" => *mean_nm,
                "sigma_nm" => *sigma_nm,
                "max_attempts" => *max_attempts,
            },
        }
    }
}

impl DirectionConfig {
    pub fn build(&self, stream: RandStream) -> Result<DirectionSampler, ConfigurationError> {
        match self {
            DirectionConfig::Lambertian { normal } => {
                DirectionSampler::lambertian(Vector::new(normal[0], normal[1], normal[2]), stream)
            }
            DirectionConfig::TabulatedPolar {
                angle_deg,
                weights,
                axis,
            } => DirectionSampler::tabulated_polar(
                Histogram::from_degrees(angle_deg, weights)?,
                Vector::new(axis[0], axis[1], axis[2]),
                stream,
            ),
            DirectionConfig::Fixed { direction } => DirectionSampler::fixed(
                Vector::new(direction[0], direction[1], direction[2]),
                stream,
            ),
            DirectionConfig::Isotropic => Ok(DirectionSampler::isotropic(stream)),
        }
    }

    fn from_json(value: &JsonValue) -> Result<Self, ConfigurationError> {
        match kind(value, "direction")? {
            "lambertian" => Ok(DirectionConfig::Lambertian {
                normal: vector(value, "normal")?,
            }),
            "tabulated_polar" => Ok(DirectionConfig::TabulatedPolar {
                angle_deg: numbers(value, "angle_deg")?,
                weights: numbers(value, "weights")?,
                axis: match &value["axis"] {
                    JsonValue::Null => [0.0, 0.0, 1.0],
                    _ => vector(value, "axis")?,
                },
            }),
            "fixed" => Ok(DirectionConfig::Fixed {
                direction: vector(value, "direction")?,
            }),
            "isotropic" => Ok(DirectionConfig::Isotropic),
            other => Err(ConfigurationError::Document(format!(
                "unknown direction type {:?}",
                other
            ))),
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            DirectionConfig::Lambertian { normal } => json::object! {
                "type" => "lambertian",
                "normal" => normal.to_vec(),
            },
            DirectionConfig::TabulatedPolar {
                angle_deg,
                weights,
                axis,
            } => json::object! {
                "type" => "tabulated_polar",
                "angle_deg" => angle_deg.clone(),
                "weights" => weights.clone(),
                "axis" => axis.to_vec(),
            },
            DirectionConfig::Fixed { direction } => json::object! {
                "type" => "fixed",
                "direction" => direction.to_vec(),
            },
            DirectionConfig::Isotropic => json::object! {
                "type" => "isotropic",
            },
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(text: &str) -> Result<EngineConfig, ConfigurationError> {
        let root = json::parse(text).map_err(|e| ConfigurationError::Document(e.to_string()))?;
        if !root.is_object() {
            return Err(ConfigurationError::Document(
                "top level must be an object".to_string(),
            ));
        }
        let mut config = EngineConfig::default();
        match &root["seed"] {
            JsonValue::Null => {}
            v => config.seed = Some(v.as_u64().ok_or_else(|| invalid("seed", "an unsigned integer"))?),
        }
        match &root["region"] {
            JsonValue::Null => {}
            v => {
                config.region = v
                    .as_str()
                    .ok_or_else(|| invalid("region", "a string"))?
                    .to_string()
            }
        }
        if !root["energy"].is_null() {
            config.energy = EnergyConfig::from_json(&root["energy"])?;
        }
        if !root["direction"].is_null() {
            config.direction = DirectionConfig::from_json(&root["direction"])?;
        }
        Ok(config)
    }

    /// Renders the configuration as a JSON document that
    /// [EngineConfig::from_json] reads back unchanged.
    pub fn to_json(&self) -> String {
        let mut root = json::object! {
            "region" => self.region.as_str(),
            "energy" => self.energy.to_json(),
            "direction" => self.direction.to_json(),
        };
        if let Some(seed) = self.seed {
            root["seed"] = seed.into();
        }
        root.pretty(2)
    }

    /// The root stream of one worker.
    pub fn worker_stream(&self, worker_index: u64) -> RandStream {
        match self.seed {
            Some(seed) => RandStream::derive(seed, worker_index),
            None => RandStream::from_entropy(),
        }
    }

    /// Builds the engine of worker `worker_index`. Every sampler gets its
    /// own stream split off the worker's root stream.
    pub fn build_engine<V: VertexProvider>(
        &self,
        vertex: V,
        worker_index: u64,
    ) -> Result<PhotonEmissionEngine<V>, ConfigurationError> {
        let mut stream = self.worker_stream(worker_index);
        let energy = self.energy.build(stream.fork())?;
        let direction = self.direction.build(stream.fork())?;
        PhotonEmissionEngine::builder()
            .region(self.region.clone())
            .energy(energy)
            .direction(direction)
            .vertex(vertex)
            .build()
    }
}

fn invalid(key: &str, expected: &str) -> ConfigurationError {
    ConfigurationError::Document(format!("{:?} must be {}", key, expected))
}

fn kind<'a>(value: &'a JsonValue, section: &str) -> Result<&'a str, ConfigurationError> {
    value["type"].as_str().ok_or_else(|| {
        ConfigurationError::Document(format!("{:?} section needs a \"type\" string", section))
    })
}

fn number(value: &JsonValue, key: &str) -> Result<f64, ConfigurationError> {
    value[key].as_f64().ok_or_else(|| invalid(key, "a number"))
}

fn numbers(value: &JsonValue, key: &str) -> Result<Vec<f64>, ConfigurationError> {
    let array = &value[key];
    if !array.is_array() {
        return Err(invalid(key, "an array of numbers"));
    }
    array
        .members()
        .map(|m| m.as_f64().ok_or_else(|| invalid(key, "an array of numbers")))
        .collect()
}

fn vector(value: &JsonValue, key: &str) -> Result<[f64; 3], ConfigurationError> {
    match numbers(value, key)?.as_slice() {
        &[x, y, z] => Ok([x, y, z]),
        _ => Err(invalid(key, "an array of 3 numbers")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::Vectord;
    use crate::vertex::PointSource;

    fn origin() -> PointSource {
        PointSource::new(Vectord::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn default_config_builds() {
        let mut engine = EngineConfig::default().build_engine(origin(), 0).unwrap();
        assert_eq!(engine.region(), "source");
        let record = engine.emit_one().unwrap();
        assert!(record.kinetic_energy > 2.4 && record.kinetic_energy < 3.1);
        assert!(record.direction.z >= 0.0);
    }

    #[test]
    fn parses_every_section() {
        let config = EngineConfig::from_json(
            r#"{
                "seed": 4294967297,
                "region": "LED_3",
                "energy": { "type": "gaussian_wavelength", "mean_nm": 450, "sigma_nm": 10 },
                "direction": { "type": "fixed", "direction": [0, 1, 0] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(4_294_967_297));
        assert_eq!(config.region, "LED_3");
        assert_eq!(
            config.energy,
            EnergyConfig::GaussianWavelength {
                mean_nm: 450.0,
                sigma_nm: 10.0,
                max_attempts: DEFAULT_MAX_ATTEMPTS
            }
        );
        assert_eq!(
            config.direction,
            DirectionConfig::Fixed {
                direction: [0.0, 1.0, 0.0]
            }
        );
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig {
            seed: Some(99),
            region: "window".to_string(),
            energy: EnergyConfig::EnergySpectrum {
                energy_ev: vec![2.0, 2.5, 3.0],
                weights: vec![1.0, 2.0],
            },
            direction: DirectionConfig::Lambertian {
                normal: [0.0, 0.0, -1.0],
            },
        };
        assert_eq!(EngineConfig::from_json(&config.to_json()).unwrap(), config);
        let default = EngineConfig::default();
        assert_eq!(EngineConfig::from_json(&default.to_json()).unwrap(), default);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let cases = [
            "not json",
            "[1, 2]",
            r#"{"seed": -1}"#,
            r#"{"region": 5}"#,
            r#"{"energy": {"type": "laser"}}"#,
            r#"{"energy": {"type": "monoenergetic"}}"#,
            r#"{"direction": {"type": "fixed", "direction": [1, 0]}}"#,
            r#"{"direction": {"normal": [0, 0, 1]}}"#,
        ];
        for text in cases {
            assert!(
                matches!(
                    EngineConfig::from_json(text),
                    Err(ConfigurationError::Document(_))
                ),
                "{} was accepted",
                text
            );
        }
    }

    #[test]
    fn bad_calibration_fails_at_build() {
        let config = EngineConfig::from_json(
            r#"{"energy": {"type": "energy_spectrum", "energy_ev": [1, 2, 3], "weights": [1, 1, 1]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.build_engine(origin(), 0).unwrap_err(),
            ConfigurationError::SizeMismatch {
                edges: 3,
                weights: 3
            }
        );
    }

    #[test]
    fn workers_get_distinct_reproducible_streams() {
        let config = EngineConfig {
            seed: Some(7),
            ..EngineConfig::default()
        };
        let mut a0 = config.build_engine(origin(), 0).unwrap();
        let mut a0_again = config.build_engine(origin(), 0).unwrap();
        let mut a1 = config.build_engine(origin(), 1).unwrap();
        let first: Vec<_> = (0..20).map(|_| a0.emit_one().unwrap()).collect();
        let again: Vec<_> = (0..20).map(|_| a0_again.emit_one().unwrap()).collect();
        let other: Vec<_> = (0..20).map(|_| a1.emit_one().unwrap()).collect();
        assert_eq!(first, again);
        assert_ne!(first, other);
    }
}
