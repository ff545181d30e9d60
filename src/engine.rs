//! Per-event photon emission.
//!
//! One [PhotonEmissionEngine] per worker. An engine owns every sampler and
//! stream it draws from, so workers never share random state and need no
//! locking.

use crate::direction::DirectionSampler;
use crate::energy::EnergySampler;
use crate::error::{ConfigurationError, SamplingError};
use crate::vec3::Vectord;
use crate::vertex::VertexProvider;

/// Start time of every emitted photon.
pub const EMISSION_TIME: f64 = 0.0;

/// Initial state of one primary photon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionRecord {
    /// Unit momentum direction
    pub direction: Vectord,
    /// Unit vector orthogonal to `direction`
    pub polarization: Vectord,
    /// Kinetic energy in eV, always positive
    pub kinetic_energy: f64,
    pub position: Vectord,
    pub time: f64,
}

/// Composes one energy sampler, one direction sampler and a vertex source.
#[derive(Debug)]
pub struct PhotonEmissionEngine<V> {
    region: String,
    energy: EnergySampler,
    direction: DirectionSampler,
    vertex: V,
    emitted: u64,
    failures: u64,
}

impl<V: VertexProvider> PhotonEmissionEngine<V> {
    pub fn builder() -> EngineBuilder<V> {
        EngineBuilder::new()
    }

    /// Emits the initial state of one photon.
    ///
    /// Draws the energy, then direction and polarization, then asks the
    /// vertex provider for a position in this engine's region.
    ///
    /// # Errors
    /// Propagates [SamplingError] from the energy sampler. Nothing else
    /// is drawn for a failed event; whether to drop, retry, or abort is
    /// the caller's call.
    pub fn emit_one(&mut self) -> Result<EmissionRecord, SamplingError> {
        let kinetic_energy = match self.energy.sample() {
            Ok(energy) => energy,
            Err(err) => {
                self.failures += 1;
                return Err(err);
            }
        };
        let emission = self.direction.sample();
        let position = self.vertex.generate_vertex(&self.region);
        self.emitted += 1;
        Ok(EmissionRecord {
            direction: emission.direction,
            polarization: emission.polarization,
            kinetic_energy,
            position,
            time: EMISSION_TIME,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Number of records emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Number of `emit_one` calls that failed.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn energy_sampler(&self) -> &EnergySampler {
        &self.energy
    }

    pub fn direction_sampler(&self) -> &DirectionSampler {
        &self.direction
    }

    pub fn vertex_provider(&mut self) -> &mut V {
        &mut self.vertex
    }
}

/// Collects every engine component up front, so an engine can never be
/// asked to emit before its samplers exist.
#[derive(Debug)]
pub struct EngineBuilder<V> {
    region: String,
    energy: Option<EnergySampler>,
    direction: Option<DirectionSampler>,
    vertex: Option<V>,
}

impl<V: VertexProvider> EngineBuilder<V> {
    pub fn new() -> Self {
        EngineBuilder {
            region: String::new(),
            energy: None,
            direction: None,
            vertex: None,
        }
    }

    /// Region label handed to the vertex provider on every event.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn energy(mut self, energy: EnergySampler) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn direction(mut self, direction: DirectionSampler) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn vertex(mut self, vertex: V) -> Self {
        self.vertex = Some(vertex);
        self
    }

    /// # Errors
    /// [ConfigurationError::MissingSampler] naming the first absent part.
    pub fn build(self) -> Result<PhotonEmissionEngine<V>, ConfigurationError> {
        let energy = self.energy.ok_or(ConfigurationError::MissingSampler("energy"))?;
        let direction = self
            .direction
            .ok_or(ConfigurationError::MissingSampler("direction"))?;
        let vertex = self.vertex.ok_or(ConfigurationError::MissingSampler("vertex"))?;
        tracing::debug!(region = %self.region, "built photon emission engine");
        Ok(PhotonEmissionEngine {
            region: self.region,
            energy,
            direction,
            vertex,
            emitted: 0,
            failures: 0,
        })
    }
}

impl<V: VertexProvider> Default for EngineBuilder<V> {
    fn default() -> Self {
        EngineBuilder::new()
    }
}
