//! Built-in calibration tables.
//!
//! Literal measured curves for the default emitter, a blue InGaN LED. Both
//! tables are authored the way they come off the bench: spectra over
//! wavelength (longest first, so the energy edges come out increasing) and
//! angular profiles over degrees off-axis.

use crate::error::ConfigurationError;
use crate::histogram::Histogram;

/// Bin edges of the blue LED spectrum, nm.
pub const BLUE_LED_WAVELENGTH_NM: [f64; 15] = [
    500.0, 490.0, 480.0, 475.0, 470.0, 465.0, 460.0, 455.0, 450.0, 445.0, 440.0, 435.0, 430.0,
    420.0, 410.0,
];

/// Relative intensity per bin of [BLUE_LED_WAVELENGTH_NM].
pub const BLUE_LED_INTENSITY: [f64; 14] = [
    0.02, 0.06, 0.14, 0.27, 0.45, 0.68, 0.90, 1.00, 0.93, 0.71, 0.42, 0.19, 0.06, 0.01,
];

/// Bin edges of the LED far-field profile, degrees off the optical axis.
pub const LED_ANGLE_DEG: [f64; 10] = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

/// Relative intensity per bin of [LED_ANGLE_DEG].
pub const LED_ANGULAR_INTENSITY: [f64; 9] = [1.00, 0.97, 0.90, 0.78, 0.62, 0.45, 0.28, 0.13, 0.03];

/// Blue LED emission spectrum as an energy histogram (eV).
pub fn blue_led_spectrum() -> Result<Histogram, ConfigurationError> {
    Histogram::from_wavelength_table(&BLUE_LED_WAVELENGTH_NM, &BLUE_LED_INTENSITY)
}

/// LED far-field polar profile as an angle histogram (radians).
pub fn led_angular_profile() -> Result<Histogram, ConfigurationError> {
    Histogram::from_degrees(&LED_ANGLE_DEG, &LED_ANGULAR_INTENSITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::wavelength_to_energy;

    #[test]
    fn built_in_tables_are_valid() {
        let spectrum = blue_led_spectrum().unwrap();
        assert_eq!(spectrum.bin_count(), BLUE_LED_INTENSITY.len());
        let (low, high) = spectrum.domain();
        assert!((low - wavelength_to_energy(500.0)).abs() < 1e-12);
        assert!((high - wavelength_to_energy(410.0)).abs() < 1e-12);

        let profile = led_angular_profile().unwrap();
        assert!(profile.domain().1 <= std::f64::consts::PI);
    }
}
