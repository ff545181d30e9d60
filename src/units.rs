//! Photon energy and wavelength conversions.
//!
//! Energies are in eV and wavelengths in nm everywhere in the crate.

/// Planck constant times the speed of light, in eV·nm.
pub const HC_EV_NM: f64 = 1239.841_984;

/// Converts a vacuum wavelength in nm to a photon energy in eV.
#[inline]
pub fn wavelength_to_energy(wavelength_nm: f64) -> f64 {
    HC_EV_NM / wavelength_nm
}

/// Converts a photon energy in eV to a vacuum wavelength in nm.
#[inline]
pub fn energy_to_wavelength(energy_ev: f64) -> f64 {
    HC_EV_NM / energy_ev
}
