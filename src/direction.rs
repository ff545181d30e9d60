use std::f64::consts::{PI, TAU};

use crate::error::ConfigurationError;
use crate::histogram::Histogram;
use crate::piecewise::PiecewiseConstantSampler;
use crate::rand_gen::RandStream;
use crate::vec3::{Vector, Vectord};

/// A sampled emission direction and its polarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    /// Unit momentum direction
    pub direction: Vectord,
    /// Unit vector orthogonal to `direction`
    pub polarization: Vectord,
}

/// The angular law an emitter follows. Chosen once, when the sampler is
/// built.
#[derive(Debug)]
pub enum EmissionLaw {
    /// Cosine-weighted hemisphere about a plane normal, for diffusely
    /// emitting flat surfaces.
    Lambertian { normal: Vectord },
    /// Polar angle drawn from a measured profile around `axis`, azimuth
    /// uniform in \[0, 2π).
    TabulatedPolar {
        polar: PiecewiseConstantSampler,
        axis: Vectord,
    },
    /// Always the same unit vector.
    Fixed { direction: Vectord },
    /// Uniform over the full sphere.
    Isotropic,
}

/// Samples directions according to an [EmissionLaw] and attaches a
/// polarization drawn uniformly in the plane perpendicular to each
/// direction.
#[derive(Debug)]
pub struct DirectionSampler {
    law: EmissionLaw,
    stream: RandStream,
}

fn unit(v: Vectord, what: &'static str) -> Result<Vectord, ConfigurationError> {
    v.try_normalized().ok_or(ConfigurationError::ZeroVector(what))
}

impl DirectionSampler {
    pub fn lambertian(normal: Vectord, stream: RandStream) -> Result<Self, ConfigurationError> {
        let normal = unit(normal, "plane normal")?;
        Ok(DirectionSampler {
            law: EmissionLaw::Lambertian { normal },
            stream,
        })
    }

    /// `polar_profile` is a histogram over the polar angle in radians,
    /// measured from `axis`; it must lie within \[0, π\]. The profile
    /// sampler gets its own stream, split off from `stream`.
    pub fn tabulated_polar(
        polar_profile: Histogram,
        axis: Vectord,
        mut stream: RandStream,
    ) -> Result<Self, ConfigurationError> {
        let axis = unit(axis, "optical axis")?;
        let (low, high) = polar_profile.domain();
        if low < 0.0 || high > PI {
            return Err(ConfigurationError::PolarAngleOutOfRange { low, high });
        }
        let polar = PiecewiseConstantSampler::new(polar_profile, stream.fork())?;
        Ok(DirectionSampler {
            law: EmissionLaw::TabulatedPolar { polar, axis },
            stream,
        })
    }

    pub fn fixed(direction: Vectord, stream: RandStream) -> Result<Self, ConfigurationError> {
        let direction = unit(direction, "emission direction")?;
        Ok(DirectionSampler {
            law: EmissionLaw::Fixed { direction },
            stream,
        })
    }

    pub fn isotropic(stream: RandStream) -> Self {
        DirectionSampler {
            law: EmissionLaw::Isotropic,
            stream,
        }
    }

    pub fn law(&self) -> &EmissionLaw {
        &self.law
    }

    /// Draws a direction, then its polarization.
    pub fn sample(&mut self) -> Emission {
        let direction = self.sample_direction();
        let polarization = self.sample_polarization(&direction);
        Emission {
            direction,
            polarization,
        }
    }

    fn sample_direction(&mut self) -> Vectord {
        match &mut self.law {
            EmissionLaw::Lambertian { normal } => {
                // cos θ = sqrt(1 - u) is strictly positive, so the draw
                // never grazes the emitting plane
                let cos_theta = self.stream.uniform_open_closed().sqrt();
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                let phi = TAU * self.stream.uniform();
                let (sin_phi, cos_phi) = phi.sin_cos();
                let local = Vector::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta);
                normal.from_local_frame(&local).normalized()
            }
            EmissionLaw::TabulatedPolar { polar, axis } => {
                let theta = polar.sample();
                let phi = TAU * self.stream.uniform();
                let local = Vector::from_spherical(1.0, theta, phi);
                axis.from_local_frame(&local).normalized()
            }
            EmissionLaw::Fixed { direction } => *direction,
            EmissionLaw::Isotropic => Vectord::random_isotropic_normed(&mut self.stream),
        }
    }

    /// Rotates a fixed perpendicular of `direction` about `direction` by a
    /// uniform angle.
    fn sample_polarization(&mut self, direction: &Vectord) -> Vectord {
        let (u, v) = direction.orthonormal_basis();
        let psi = TAU * self.stream.uniform();
        let (sin_psi, cos_psi) = psi.sin_cos();
        (u * cos_psi + v * sin_psi).normalized()
    }
}
