//! Validated bin-edge/weight tables over a physical domain.

use crate::error::ConfigurationError;
use crate::units::wavelength_to_energy;

/// An immutable piecewise-constant density: `weights[i]` is the density
/// over the half-open bin `[edges[i], edges[i + 1])`.
///
/// Construction is the only place the table is checked, so every
/// `Histogram` in existence has `edges.len() == weights.len() + 1`,
/// finite, strictly increasing edges and non-negative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    weights: Vec<f64>,
}

impl Histogram {
    /// Validates and builds a histogram.
    ///
    /// # Errors
    /// * [ConfigurationError::SizeMismatch] when `edges.len() != weights.len() + 1`
    /// * [ConfigurationError::TooFewEdges] when there is not a single bin
    /// * [ConfigurationError::NonFiniteEdge], [ConfigurationError::NonIncreasingEdges]
    /// * [ConfigurationError::NegativeWeight] for negative or NaN weights
    pub fn new(edges: Vec<f64>, weights: Vec<f64>) -> Result<Histogram, ConfigurationError> {
        if edges.len() != weights.len() + 1 {
            return Err(ConfigurationError::SizeMismatch {
                edges: edges.len(),
                weights: weights.len(),
            });
        }
        if edges.len() < 2 {
            return Err(ConfigurationError::TooFewEdges(edges.len()));
        }
        if let Some((index, &value)) = edges.iter().enumerate().find(|(_, e)| !e.is_finite()) {
            return Err(ConfigurationError::NonFiniteEdge { index, value });
        }
        if let Some(index) = (1..edges.len()).find(|&i| edges[i] <= edges[i - 1]) {
            return Err(ConfigurationError::NonIncreasingEdges {
                index,
                previous: edges[index - 1],
                value: edges[index],
            });
        }
        // `!(w >= 0.0)` also catches NaN
        if let Some((index, &value)) = weights.iter().enumerate().find(|(_, w)| !(**w >= 0.0)) {
            return Err(ConfigurationError::NegativeWeight { index, value });
        }
        Ok(Histogram { edges, weights })
    }

    /// Builds an energy histogram (eV) from a table authored in wavelength
    /// (nm). Each edge is converted with `E = hc / λ` before validation, so
    /// the wavelengths must be listed in decreasing order to end up with
    /// increasing energies. Bin `i` keeps weight `i`.
    pub fn from_wavelength_table(
        wavelengths_nm: &[f64],
        weights: &[f64],
    ) -> Result<Histogram, ConfigurationError> {
        if let Some((index, &value)) = wavelengths_nm
            .iter()
            .enumerate()
            .find(|(_, l)| !(**l > 0.0))
        {
            return Err(ConfigurationError::NonPositiveWavelength { index, value });
        }
        let edges = wavelengths_nm
            .iter()
            .map(|&l| wavelength_to_energy(l))
            .collect();
        Histogram::new(edges, weights.to_vec())
    }

    /// Builds an angular histogram (radians) from edges given in degrees.
    pub fn from_degrees(edges_deg: &[f64], weights: &[f64]) -> Result<Histogram, ConfigurationError> {
        let edges = edges_deg.iter().map(|d| d.to_radians()).collect();
        Histogram::new(edges, weights.to_vec())
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bin_count(&self) -> usize {
        self.weights.len()
    }

    /// The half-open domain `[first edge, last edge)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    /// Width of bin `i`.
    #[inline]
    pub fn width(&self, i: usize) -> f64 {
        self.edges[i + 1] - self.edges[i]
    }

    /// Probability mass of every bin, `weights[i] * width(i)`, unnormalized.
    pub fn bin_masses(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(move |(i, w)| w * self.width(i))
    }

    /// Sum of `weights[i] * (edges[i + 1] - edges[i])`.
    pub fn total_mass(&self) -> f64 {
        self.bin_masses().sum()
    }

    /// Index of the bin containing `x`, if `x` lies inside the domain.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        let (low, high) = self.domain();
        if !(x >= low && x < high) {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= x) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_histogram() {
        let h = Histogram::new(vec![1.0, 2.0, 3.0], vec![1.0, 1.0]).unwrap();
        assert_eq!(h.bin_count(), 2);
        assert_eq!(h.domain(), (1.0, 3.0));
        assert_eq!(h.total_mass(), 2.0);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        assert_eq!(
            Histogram::new(vec![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0]),
            Err(ConfigurationError::SizeMismatch {
                edges: 3,
                weights: 3
            })
        );
        assert_eq!(
            Histogram::new(vec![1.0, 2.0, 3.0], vec![1.0]),
            Err(ConfigurationError::SizeMismatch {
                edges: 3,
                weights: 1
            })
        );
    }

    #[test]
    fn single_edge_is_rejected() {
        assert_eq!(
            Histogram::new(vec![1.0], vec![]),
            Err(ConfigurationError::TooFewEdges(1))
        );
    }

    #[test]
    fn non_increasing_edges_are_rejected() {
        assert_eq!(
            Histogram::new(vec![1.0, 3.0, 2.0], vec![1.0, 1.0]),
            Err(ConfigurationError::NonIncreasingEdges {
                index: 2,
                previous: 3.0,
                value: 2.0
            })
        );
        // repeated edges are not strictly increasing
        assert!(Histogram::new(vec![1.0, 1.0, 2.0], vec![1.0, 1.0]).is_err());
        assert!(Histogram::new(vec![1.0, f64::NAN, 2.0], vec![1.0, 1.0]).is_err());
        assert!(Histogram::new(vec![1.0, f64::INFINITY], vec![1.0]).is_err());
    }

    #[test]
    fn negative_weights_are_rejected() {
        assert_eq!(
            Histogram::new(vec![0.0, 1.0, 2.0], vec![1.0, -0.5]),
            Err(ConfigurationError::NegativeWeight {
                index: 1,
                value: -0.5
            })
        );
        assert!(Histogram::new(vec![0.0, 1.0], vec![f64::NAN]).is_err());
    }

    #[test]
    fn zero_weights_are_valid() {
        let h = Histogram::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.0]).unwrap();
        assert_eq!(h.total_mass(), 0.0);
    }

    #[test]
    fn validity_matches_invariants() {
        // construction succeeds iff edges strictly increase and weights are non-negative
        let cases = vec![
            (vec![0.0, 1.0], vec![2.0], true),
            (vec![0.0, 1.0, 5.0, 6.0], vec![0.0, 1.0, 0.5], true),
            (vec![0.0, 1.0, 1.0], vec![1.0, 1.0], false),
            (vec![2.0, 1.0], vec![1.0], false),
            (vec![0.0, 1.0, 2.0], vec![1.0, -1e-9], false),
            (vec![-3.0, -2.0, -1.0], vec![0.1, 0.2], true),
        ];
        for (edges, weights, valid) in cases {
            assert_eq!(
                Histogram::new(edges.clone(), weights.clone()).is_ok(),
                valid,
                "edges {:?}, weights {:?}",
                edges,
                weights
            );
        }
    }

    #[test]
    fn total_mass_weights_by_width() {
        let h = Histogram::new(vec![0.0, 1.0, 3.0], vec![2.0, 0.5]).unwrap();
        assert_eq!(h.bin_masses().collect::<Vec<_>>(), vec![2.0, 1.0]);
        assert_eq!(h.total_mass(), 3.0);
    }

    #[test]
    fn bin_lookup_is_half_open() {
        let h = Histogram::new(vec![1.0, 2.0, 3.0], vec![1.0, 1.0]).unwrap();
        assert_eq!(h.bin_index(1.0), Some(0));
        assert_eq!(h.bin_index(1.999), Some(0));
        assert_eq!(h.bin_index(2.0), Some(1));
        assert_eq!(h.bin_index(3.0), None);
        assert_eq!(h.bin_index(0.5), None);
        assert_eq!(h.bin_index(f64::NAN), None);
    }

    #[test]
    fn decreasing_wavelengths_become_increasing_energies() {
        let h = Histogram::from_wavelength_table(&[400.0, 300.0, 200.0], &[1.0, 2.0]).unwrap();
        assert!(h.edges().windows(2).all(|w| w[0] < w[1]));
        assert!((h.edges()[0] - 3.0996).abs() < 1e-3);
        assert!((h.edges()[2] - 6.1992).abs() < 1e-3);
        assert_eq!(h.weights(), &[1.0, 2.0]);
    }

    #[test]
    fn increasing_wavelengths_fail_after_conversion() {
        assert!(matches!(
            Histogram::from_wavelength_table(&[200.0, 300.0], &[1.0]),
            Err(ConfigurationError::NonIncreasingEdges { .. })
        ));
    }

    #[test]
    fn non_positive_wavelength_is_rejected() {
        assert_eq!(
            Histogram::from_wavelength_table(&[400.0, 0.0], &[1.0]),
            Err(ConfigurationError::NonPositiveWavelength {
                index: 1,
                value: 0.0
            })
        );
    }

    #[test]
    fn degrees_are_converted() {
        let h = Histogram::from_degrees(&[0.0, 90.0], &[1.0]).unwrap();
        assert!((h.domain().1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
