//! Coordinate value type and notation converters for BetterLocation.
//!
//! This crate provides:
//! - A validated, immutable WGS84 [`Coordinate`]
//! - Hemisphere symbol resolution for loosely written coordinate pairs
//! - Degree/minute/second arithmetic
//! - UTM, MGRS/USNG, Maidenhead and Geohash conversions
//!
//! Everything here is pure: no I/O and no shared state.
//!
//! # Example
//!
//! ```
//! use betterlocation_geo::Coordinate;
//!
//! let prague = Coordinate::new(50.087451, 14.420671).unwrap();
//! assert_eq!(prague.key(), "50.087451,14.420671");
//! assert!(Coordinate::new(90.0000001, 0.0).is_err());
//! ```

pub mod dms;
mod error;
pub mod geohash;
pub mod hemisphere;
pub mod maidenhead;
pub mod mgrs;
pub mod utm;

pub use error::{GeoError, GeoErrorCode, Result};
pub use hemisphere::{resolve_pair, Axis, Hemisphere, RawAxis};
pub use mgrs::Mgrs;
pub use utm::Utm;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used by [`Coordinate::key`].
pub const KEY_PRECISION: usize = 6;

/// A geographic coordinate with latitude and longitude in decimal degrees.
///
/// Construction validates the bounds; there is no way to obtain an
/// out-of-range value, and no setter exists after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    ///
    /// # Errors
    /// Returns [`GeoError::LatitudeOutOfRange`] or [`GeoError::LongitudeOutOfRange`]
    /// when a bound is violated (NaN included). Values are never clamped.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Deduplication key: both axes formatted to six decimal places.
    ///
    /// ```
    /// use betterlocation_geo::Coordinate;
    ///
    /// let coord = Coordinate::new(-0.0000001, 14.2).unwrap();
    /// assert_eq!(coord.key(), "0.000000,14.200000");
    /// ```
    pub fn key(&self) -> String {
        format!("{},{}", key_component(self.latitude), key_component(self.longitude))
    }

    /// Returns true if both coordinates share the same deduplication key.
    pub fn same_key(&self, other: &Coordinate) -> bool {
        self.key() == other.key()
    }
}

fn key_component(value: f64) -> String {
    let formatted = format!("{:.*}", KEY_PRECISION, value);
    // -0.0000001 rounds to "-0.000000"; strip the sign so it keys like 0.0
    match formatted.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => formatted,
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = GeoError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self> {
        Self::new(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coordinate_creation() {
        let coord = Coordinate::new(52.5200, 13.4050).unwrap();
        assert_eq!(coord.latitude(), 52.5200);
        assert_eq!(coord.longitude(), 13.4050);
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_boundary_values_rejected() {
        assert_eq!(
            Coordinate::new(90.000_000_1, 0.0),
            Err(GeoError::LatitudeOutOfRange(90.000_000_1))
        );
        assert_eq!(
            Coordinate::new(0.0, 180.000_000_1),
            Err(GeoError::LongitudeOutOfRange(180.000_000_1))
        );
        assert!(Coordinate::new(-90.000_000_1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.000_000_1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_key_format() {
        let coord = Coordinate::new(50.087451, 14.420671).unwrap();
        assert_eq!(coord.key(), "50.087451,14.420671");
        assert_eq!(coord.to_string(), "50.087451,14.420671");

        let coord = Coordinate::new(-33.5, -70.25).unwrap();
        assert_eq!(coord.key(), "-33.500000,-70.250000");
    }

    #[test]
    fn test_key_negative_zero() {
        let a = Coordinate::new(-0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, -0.000_000_4).unwrap();
        assert_eq!(a.key(), "0.000000,0.000000");
        assert!(a.same_key(&b));
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (52.5200, 13.4050).try_into().unwrap();
        assert_eq!(coord.latitude(), 52.5200);
        assert!(Coordinate::try_from((100.0, 0.0)).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude": 50.1, "longitude": 14.2}"#).unwrap();
        assert_eq!(ok.key(), "50.100000,14.200000");

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 95.0, "longitude": 14.2}"#);
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn prop_in_range_always_accepted(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let coord = Coordinate::new(lat, lon).unwrap();
            prop_assert_eq!(coord.latitude(), lat);
            prop_assert_eq!(coord.longitude(), lon);
        }

        #[test]
        fn prop_latitude_above_range_rejected(lat in 90.000_000_1f64..1000.0, lon in -180.0f64..=180.0) {
            prop_assert!(Coordinate::new(lat, lon).is_err());
            prop_assert!(Coordinate::new(-lat, lon).is_err());
        }
    }
}
