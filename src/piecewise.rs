use crate::error::ConfigurationError;
use crate::histogram::Histogram;
use crate::rand_gen::RandStream;

/// Draws continuous values from a [Histogram]'s piecewise-constant density.
///
/// A bin is picked with probability proportional to its mass
/// (`weight * width`) by inverting the cumulative mass table, then the
/// value is drawn uniformly inside that bin. The histogram needs no
/// normalization.
#[derive(Debug)]
pub struct PiecewiseConstantSampler {
    histogram: Histogram,
    /// Running sum of bin masses; `cumulative[i]` is the mass of bins `0..=i`.
    cumulative: Vec<f64>,
    /// Last bin with non-zero mass, the fallback when rounding pushes the
    /// target to the very top of the table.
    last_populated: usize,
    stream: RandStream,
}

impl PiecewiseConstantSampler {
    /// Wraps a histogram, taking ownership of it and of the stream.
    ///
    /// Fails with [ConfigurationError::ZeroMass] if every bin is empty, so
    /// that [PiecewiseConstantSampler::sample] cannot fail afterwards.
    pub fn new(
        histogram: Histogram,
        stream: RandStream,
    ) -> Result<PiecewiseConstantSampler, ConfigurationError> {
        let cumulative: Vec<f64> = histogram
            .bin_masses()
            .scan(0.0, |acc, m| {
                *acc += m;
                Some(*acc)
            })
            .collect();
        let last_populated = histogram.weights().iter().rposition(|&w| w > 0.0);
        let total = cumulative.last().copied().unwrap_or(0.0);
        let last_populated = match last_populated {
            Some(i) if total > 0.0 && total.is_finite() => i,
            _ => {
                let (low, high) = histogram.domain();
                return Err(ConfigurationError::ZeroMass { low, high });
            }
        };
        tracing::debug!(
            bins = histogram.bin_count(),
            total_mass = total,
            seed = ?stream.seed(),
            "built piecewise-constant sampler"
        );
        Ok(PiecewiseConstantSampler {
            histogram,
            cumulative,
            last_populated,
            stream,
        })
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Total (unnormalized) mass of the wrapped histogram.
    pub fn total_mass(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Draws one value in `[edges[0], edges[N])`.
    pub fn sample(&mut self) -> f64 {
        let bin = self.sample_bin();
        let low = self.histogram.edges()[bin];
        let high = self.histogram.edges()[bin + 1];
        let x = low + (high - low) * self.stream.uniform();
        // low + width * u can round up to the excluded upper edge
        if x < high {
            x
        } else {
            low
        }
    }

    /// Draws a bin index with probability proportional to its mass.
    /// Empty bins are never returned.
    pub fn sample_bin(&mut self) -> usize {
        let target = self.stream.uniform() * self.total_mass();
        // First bin whose cumulative mass exceeds the target. Empty bins
        // share their predecessor's cumulative value, so they are skipped.
        let bin = self.cumulative.partition_point(|&c| c <= target);
        bin.min(self.last_populated)
    }
}
