use crate::error::{ConfigurationError, SamplingError};
use crate::rand_gen::RandStream;

/// Attempts made per call unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Normal base distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    mean: f64,
    std_dev: f64,
}

impl Gaussian {
    pub fn new(mean: f64, std_dev: f64) -> Result<Gaussian, ConfigurationError> {
        if !mean.is_finite() {
            return Err(ConfigurationError::InvalidMean(mean));
        }
        if !(std_dev > 0.0 && std_dev.is_finite()) {
            return Err(ConfigurationError::InvalidSpread(std_dev));
        }
        Ok(Gaussian { mean, std_dev })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn draw(&self, stream: &mut RandStream) -> f64 {
        self.mean + self.std_dev * stream.normal()
    }

    /// P(X < x).
    pub fn cdf(&self, x: f64) -> f64 {
        0.5 * erfc((self.mean - x) / (self.std_dev * std::f64::consts::SQRT_2))
    }
}

/// Which base draws count as physical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    /// `x > 0`
    Positive,
    /// `x > threshold`
    GreaterThan(f64),
    /// `low < x < high`
    Within { low: f64, high: f64 },
}

impl Acceptance {
    pub fn accepts(&self, x: f64) -> bool {
        match *self {
            Acceptance::Positive => x > 0.0,
            Acceptance::GreaterThan(threshold) => x > threshold,
            Acceptance::Within { low, high } => x > low && x < high,
        }
    }

    /// Probability that one draw from `base` is accepted.
    pub fn probability(&self, base: &Gaussian) -> f64 {
        let p = match *self {
            Acceptance::Positive => 1.0 - base.cdf(0.0),
            Acceptance::GreaterThan(threshold) => 1.0 - base.cdf(threshold),
            Acceptance::Within { low, high } if high > low => base.cdf(high) - base.cdf(low),
            Acceptance::Within { .. } => 0.0,
        };
        p.max(0.0).min(1.0)
    }
}

/// Draws from a [Gaussian] and discards non-physical values, giving up
/// after a fixed number of attempts instead of looping forever when the
/// configured distribution sits mostly outside the acceptance region.
#[derive(Debug)]
pub struct BoundedRejectionSampler {
    base: Gaussian,
    acceptance: Acceptance,
    max_attempts: u32,
    stream: RandStream,
}

impl BoundedRejectionSampler {
    pub fn new(
        base: Gaussian,
        acceptance: Acceptance,
        max_attempts: u32,
        stream: RandStream,
    ) -> Result<BoundedRejectionSampler, ConfigurationError> {
        if max_attempts == 0 {
            return Err(ConfigurationError::ZeroAttempts);
        }
        let sampler = BoundedRejectionSampler {
            base,
            acceptance,
            max_attempts,
            stream,
        };
        tracing::debug!(
            mean = base.mean,
            std_dev = base.std_dev,
            max_attempts,
            acceptance = sampler.acceptance_probability(),
            "built bounded rejection sampler"
        );
        Ok(sampler)
    }

    pub fn base(&self) -> &Gaussian {
        &self.base
    }

    pub fn acceptance(&self) -> Acceptance {
        self.acceptance
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the first accepted draw out of at most `max_attempts`.
    ///
    /// # Errors
    /// [SamplingError::Exhausted] when every attempt was rejected.
    pub fn sample(&mut self) -> Result<f64, SamplingError> {
        for _ in 0..self.max_attempts {
            let x = self.base.draw(&mut self.stream);
            if self.acceptance.accepts(x) {
                return Ok(x);
            }
        }
        tracing::warn!(
            mean = self.base.mean,
            std_dev = self.base.std_dev,
            attempts = self.max_attempts,
            "no acceptable draw, check the configured mean and spread"
        );
        Err(SamplingError::Exhausted {
            mean: self.base.mean,
            std_dev: self.base.std_dev,
            attempts: self.max_attempts,
        })
    }

    /// Probability that a single base draw is accepted. The same for every
    /// call.
    pub fn acceptance_probability(&self) -> f64 {
        self.acceptance.probability(&self.base)
    }

    /// Probability that one [BoundedRejectionSampler::sample] call fails.
    pub fn exhaustion_probability(&self) -> f64 {
        (1.0 - self.acceptance_probability()).powi(self.max_attempts as i32)
    }

    /// Smallest attempt count whose exhaustion probability does not exceed
    /// `target_failure`, or `None` if no draw can ever be accepted.
    pub fn attempts_for(&self, target_failure: f64) -> Option<u32> {
        let p = self.acceptance_probability();
        if p <= 0.0 {
            return None;
        }
        if p >= 1.0 || target_failure >= 1.0 {
            return Some(1);
        }
        if target_failure <= 0.0 {
            return None;
        }
        let n = (target_failure.ln() / (1.0 - p).ln()).ceil();
        Some(n.max(1.0).min(u32::MAX as f64) as u32)
    }
}

/// Complementary error function.
///
/// Chebyshev fit from Numerical Recipes (`erfcc`), fractional error below
/// 1.2e-7 over the whole real line, which keeps tail probabilities usable.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(mean: f64, std_dev: f64, seed: u64) -> BoundedRejectionSampler {
        BoundedRejectionSampler::new(
            Gaussian::new(mean, std_dev).unwrap(),
            Acceptance::Positive,
            DEFAULT_MAX_ATTEMPTS,
            RandStream::seeded(seed),
        )
        .unwrap()
    }

    #[test]
    fn hopeless_distribution_exhausts() {
        let mut s = sampler(-100.0, 1.0, 1);
        for _ in 0..1000 {
            assert_eq!(
                s.sample(),
                Err(SamplingError::Exhausted {
                    mean: -100.0,
                    std_dev: 1.0,
                    attempts: 3
                })
            );
        }
    }

    #[test]
    fn comfortable_distribution_succeeds() {
        let mut s = sampler(500.0, 4.0, 2);
        for _ in 0..10_000 {
            let x = s.sample().unwrap();
            assert!(x > 0.0);
        }
    }

    #[test]
    fn accepted_draws_satisfy_predicate() {
        let mut s = BoundedRejectionSampler::new(
            Gaussian::new(0.0, 1.0).unwrap(),
            Acceptance::Within {
                low: -0.5,
                high: 0.5,
            },
            8,
            RandStream::seeded(3),
        )
        .unwrap();
        for _ in 0..5000 {
            if let Ok(x) = s.sample() {
                assert!(x > -0.5 && x < 0.5);
            }
        }
    }

    #[test]
    fn empirical_failure_rate_matches_calculation() {
        // mean on the boundary: half the draws are rejected, 1/8 of calls fail
        let mut s = sampler(0.0, 1.0, 4);
        assert!((s.acceptance_probability() - 0.5).abs() < 1e-6);
        assert!((s.exhaustion_probability() - 0.125).abs() < 1e-6);
        let n = 40_000;
        let failures = (0..n).filter(|_| s.sample().is_err()).count();
        let rate = failures as f64 / n as f64;
        assert!((rate - 0.125).abs() < 0.01, "rate {}", rate);
    }

    #[test]
    fn attempts_for_target() {
        let s = sampler(0.0, 1.0, 5);
        // 0.5^10 < 1e-3 <= 0.5^9
        assert_eq!(s.attempts_for(1e-3), Some(10));
        assert_eq!(sampler(-100.0, 1.0, 5).attempts_for(1e-3), None);
        assert_eq!(sampler(500.0, 4.0, 5).attempts_for(1e-9), Some(1));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(
            Gaussian::new(1.0, 0.0),
            Err(ConfigurationError::InvalidSpread(0.0))
        );
        assert!(Gaussian::new(f64::NAN, 1.0).is_err());
        assert!(Gaussian::new(1.0, f64::INFINITY).is_err());
        assert_eq!(
            BoundedRejectionSampler::new(
                Gaussian::new(1.0, 1.0).unwrap(),
                Acceptance::Positive,
                0,
                RandStream::seeded(0)
            )
            .unwrap_err(),
            ConfigurationError::ZeroAttempts
        );
    }

    #[test]
    fn erfc_reference_values() {
        assert!((erfc(0.0) - 1.0).abs() < 1e-7);
        assert!((erfc(1.0) - 0.157_299_207).abs() < 1e-7);
        assert!((erfc(-1.0) - 1.842_700_793).abs() < 1e-7);
        assert!(erfc(30.0) >= 0.0);
    }

    #[test]
    fn cdf_is_monotonic() {
        let g = Gaussian::new(450.0, 20.0).unwrap();
        let values: Vec<f64> = (0..100).map(|i| g.cdf(350.0 + 2.0 * i as f64)).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!((g.cdf(450.0) - 0.5).abs() < 1e-7);
    }
}
