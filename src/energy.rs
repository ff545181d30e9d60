use crate::error::{ConfigurationError, SamplingError};
use crate::histogram::Histogram;
use crate::piecewise::PiecewiseConstantSampler;
use crate::rand_gen::RandStream;
use crate::rejection::{Acceptance, BoundedRejectionSampler, Gaussian};
use crate::units::wavelength_to_energy;

/// Source of photon kinetic energies, in eV.
#[derive(Debug)]
pub enum EnergySampler {
    /// Every photon carries the same energy.
    Monoenergetic(f64),
    /// Measured emission spectrum, histogram over energy.
    Spectrum(PiecewiseConstantSampler),
    /// Normal distribution over wavelength (nm); accepted draws are
    /// converted to energy.
    GaussianWavelength(BoundedRejectionSampler),
}

impl EnergySampler {
    pub fn monoenergetic(energy_ev: f64) -> Result<EnergySampler, ConfigurationError> {
        if !(energy_ev > 0.0 && energy_ev.is_finite()) {
            return Err(ConfigurationError::InvalidEnergy(energy_ev));
        }
        Ok(EnergySampler::Monoenergetic(energy_ev))
    }

    /// `histogram` must already be over energy in eV; see
    /// [Histogram::from_wavelength_table] for wavelength tables.
    pub fn spectrum(histogram: Histogram, stream: RandStream) -> Result<EnergySampler, ConfigurationError> {
        Ok(EnergySampler::Spectrum(PiecewiseConstantSampler::new(histogram, stream)?))
    }

    /// Gaussian line in wavelength space, only positive wavelengths are
    /// accepted.
    pub fn gaussian_wavelength(
        mean_nm: f64,
        sigma_nm: f64,
        max_attempts: u32,
        stream: RandStream,
    ) -> Result<EnergySampler, ConfigurationError> {
        let sampler = BoundedRejectionSampler::new(
            Gaussian::new(mean_nm, sigma_nm)?,
            Acceptance::Positive,
            max_attempts,
            stream,
        )?;
        Ok(EnergySampler::GaussianWavelength(sampler))
    }

    /// Draws one kinetic energy in eV.
    ///
    /// # Errors
    /// Only the Gaussian variant can fail, with
    /// [SamplingError::Exhausted].
    pub fn sample(&mut self) -> Result<f64, SamplingError> {
        match self {
            EnergySampler::Monoenergetic(energy) => Ok(*energy),
            EnergySampler::Spectrum(sampler) => Ok(sampler.sample()),
            EnergySampler::GaussianWavelength(sampler) => sampler.sample().map(wavelength_to_energy),
        }
    }
}
