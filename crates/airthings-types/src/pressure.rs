//! Relative-to-absolute pressure conversion.

const P0: f64 = 101_325.0; // Pa, standard sea level
const G: f64 = 9.806_65; // m/s²
const M: f64 = 0.028_969_68; // kg/mol, molar mass of dry air
const T0: f64 = 288.16; // K
const R0: f64 = 8.314_462_618; // J/(mol·K)

/// Convert a sea-level-relative pressure (mbar) to absolute pressure at
/// `elevation` metres using the barometric formula.
///
/// The correction term is rounded to two decimals before being added.
///
/// ```
/// use airthings_types::pressure::absolute_pressure;
///
/// assert_eq!(absolute_pressure(0.0, 1000.0), 1000.0);
/// ```
#[must_use]
pub fn absolute_pressure(elevation: f64, rel_pressure: f64) -> f64 {
    let delta_pa = P0 - P0 * (-G * elevation * M / (T0 * R0)).exp();
    // Pa -> mbar, two decimals
    let delta_mbar = delta_pa.round() / 100.0;
    rel_pressure + delta_mbar
}
