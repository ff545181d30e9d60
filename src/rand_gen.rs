use std::fmt;

/// Spreads stable worker indices across the seed space.
const STREAM_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// An exclusively owned pseudo-random stream.
///
/// Every sampler owns one of these, and nothing in the crate reaches for a
/// global generator. The stream is `Send` so a worker thread can own it,
/// but it is neither `Clone` nor `Sync`: two samplers never draw from the
/// same state.
pub struct RandStream {
    inner: fastrand::Rng,
    seed: Option<u64>,
    /// Second variate of the last Box-Muller pair, consumed by the next
    /// normal draw.
    spare_normal: Option<f64>,
}

impl RandStream {
    /// Creates a deterministic stream from a seed.
    pub fn seeded(seed: u64) -> RandStream {
        RandStream {
            inner: fastrand::Rng::with_seed(seed),
            seed: Some(seed),
            spare_normal: None,
        }
    }

    /// Creates a stream seeded from system entropy.
    pub fn from_entropy() -> RandStream {
        RandStream {
            inner: fastrand::Rng::new(),
            seed: None,
            spare_normal: None,
        }
    }

    /// Derives the stream of one worker from a master seed and the worker's
    /// stable index. Adding workers never changes the streams of the
    /// existing ones.
    pub fn derive(master_seed: u64, index: u64) -> RandStream {
        RandStream::seeded(master_seed ^ index.wrapping_mul(STREAM_SPREAD))
    }

    /// Splits off an independent child stream, seeded from this stream's
    /// next draw.
    pub fn fork(&mut self) -> RandStream {
        match self.seed {
            Some(_) => RandStream::seeded(self.inner.u64(..)),
            None => RandStream::from_entropy(),
        }
    }

    /// The seed this stream was built from, `None` for entropy streams.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform draw in \[0, 1).
    #[inline(always)]
    pub fn uniform(&mut self) -> f64 {
        self.inner.f64()
    }

    /// Uniform draw in (0, 1\], safe to pass to `ln`.
    #[inline(always)]
    pub fn uniform_open_closed(&mut self) -> f64 {
        1.0 - self.inner.f64()
    }

    /// Standard normal draw. Box-Muller produces pairs, so every other call
    /// is served from the cached spare.
    pub fn normal(&mut self) -> f64 {
        if let Some(spare) = self.spare_normal.take() {
            return spare;
        }
        let (first, second) = f64::rand_normal_box_muller(self);
        self.spare_normal = Some(second);
        first
    }
}

impl fmt::Debug for RandStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandStream")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

pub trait RandGen: Sized {
    fn rand(stream: &mut RandStream) -> Self;

    fn rand_normal_box_muller(stream: &mut RandStream) -> (Self, Self)
    where
        Self: num::Float + num::traits::FloatConst,
    {
        let two = Self::one() + Self::one();
        // 1 - u keeps the logarithm's argument in (0, 1]
        let usq = (-two * (Self::one() - Self::rand(stream)).ln()).sqrt();
        let v2p = Self::rand(stream) * two * Self::PI();
        let (sin, cos) = v2p.sin_cos();
        (sin * usq, cos * usq)
    }
}

impl RandGen for f64 {
    #[inline(always)]
    fn rand(stream: &mut RandStream) -> f64 {
        stream.uniform()
    }
}
