//! Degree / minute / second arithmetic.

use crate::{Axis, GeoError, Hemisphere, Result};

/// Splits an absolute decimal value into degrees, minutes and seconds.
///
/// The sign is dropped; use [`Hemisphere::for_value`] to keep it.
///
/// ```
/// use betterlocation_geo::dms::decimal_to_dms;
///
/// let (deg, min, sec) = decimal_to_dms(-50.5125);
/// assert_eq!((deg, min), (50.0, 30.0));
/// assert!((sec - 45.0).abs() < 1e-9);
/// ```
pub fn decimal_to_dms(decimal: f64) -> (f64, f64, f64) {
    let abs = decimal.abs();
    let degrees = abs.trunc();
    let minutes_full = (abs - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let seconds = (minutes_full - minutes) * 60.0;
    (degrees, minutes, seconds)
}

/// Joins degrees, minutes and seconds into a signed decimal value.
///
/// South and west negate the magnitude.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, hemisphere: Hemisphere) -> f64 {
    hemisphere.flip() * degrees_from_dms(degrees, minutes, seconds)
}

/// Unsigned decimal magnitude of a degree/minute/second triple.
#[inline]
pub fn degrees_from_dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Like [`degrees_from_dms`] but rejects minutes or seconds of 60 and more.
///
/// # Errors
/// [`GeoError::InvalidFormat`] when a component is out of its sexagesimal range.
pub fn checked_degrees(degrees: f64, minutes: f64, seconds: f64) -> Result<f64> {
    if !(0.0..60.0).contains(&minutes) {
        return Err(GeoError::format(format!("Minutes must be below 60, got {minutes}")));
    }
    if !(0.0..60.0).contains(&seconds) {
        return Err(GeoError::format(format!("Seconds must be below 60, got {seconds}")));
    }
    Ok(degrees_from_dms(degrees, minutes, seconds))
}

/// Formats a signed value as `N 50°5'14.824"`.
///
/// Seconds are rounded to three decimals with carry into minutes and degrees.
pub fn format_dms(value: f64, axis: Axis) -> String {
    const UNITS_PER_DEGREE: u64 = 3_600_000;
    let hemisphere = Hemisphere::for_value(axis, value);
    let total = round_units(value, UNITS_PER_DEGREE);
    let degrees = total / UNITS_PER_DEGREE;
    let minutes = (total % UNITS_PER_DEGREE) / 60_000;
    let millis = total % 60_000;
    format!(
        "{} {}°{}'{}.{:03}\"",
        hemisphere,
        degrees,
        minutes,
        millis / 1000,
        millis % 1000
    )
}

/// Formats a signed value as `N 50°5.24706'`.
///
/// Minutes are rounded to five decimals with carry into degrees.
pub fn format_dm(value: f64, axis: Axis) -> String {
    const UNITS_PER_DEGREE: u64 = 6_000_000;
    let hemisphere = Hemisphere::for_value(axis, value);
    let total = round_units(value, UNITS_PER_DEGREE);
    let degrees = total / UNITS_PER_DEGREE;
    let rest = total % UNITS_PER_DEGREE;
    format!(
        "{} {}°{}.{:05}'",
        hemisphere,
        degrees,
        rest / 100_000,
        rest % 100_000
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_units(value: f64, units_per_degree: u64) -> u64 {
    (value.abs() * units_per_degree as f64).round() as u64
}
