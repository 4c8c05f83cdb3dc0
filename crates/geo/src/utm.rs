//! Universal Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! Forward and inverse series follow the classic USGS formulation
//! (Snyder, *Map Projections: A Working Manual*, pp. 61-64), accurate to
//! millimetres within a zone.

use crate::{Coordinate, GeoError, Result};
use std::fmt;

/// Latitude band letters from 80°S to 84°N. `I` and `O` are never used,
/// `A`, `B`, `Y` and `Z` belong to the polar UPS system.
pub const BAND_LETTERS: &str = "CDEFGHJKLMNPQRSTUVWX";

/// Southern-most latitude covered by UTM.
pub const MIN_LATITUDE: f64 = -80.0;

/// Northern-most latitude covered by UTM.
pub const MAX_LATITUDE: f64 = 84.0;

const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const E2: f64 = FLATTENING * (2.0 - FLATTENING);
const E4: f64 = E2 * E2;
const E6: f64 = E4 * E2;
const EP2: f64 = E2 / (1.0 - E2);

/// A position in UTM notation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utm {
    zone: u8,
    band: char,
    easting: f64,
    northing: f64,
}

impl Utm {
    /// Creates a UTM position after checking ranges of every component.
    ///
    /// # Errors
    /// [`GeoError::InvalidGrid`] for zone outside 1-60, unknown band letter,
    /// easting outside 100 000-999 999 m or northing outside 0-10 000 000 m.
    pub fn new(zone: u8, band: char, easting: f64, northing: f64) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(GeoError::grid(format!("Zone {zone} is outside 1-60")));
        }
        let band = band.to_ascii_uppercase();
        if !BAND_LETTERS.contains(band) {
            return Err(GeoError::grid(format!("Unknown latitude band '{band}'")));
        }
        if !(100_000.0..1_000_000.0).contains(&easting) {
            return Err(GeoError::grid(format!("Easting {easting} is outside the zone")));
        }
        if !(0.0..=FALSE_NORTHING_SOUTH).contains(&northing) {
            return Err(GeoError::grid(format!("Northing {northing} is outside the zone")));
        }
        Ok(Self {
            zone,
            band,
            easting,
            northing,
        })
    }

    /// Projects a coordinate into its standard zone (Norway and Svalbard
    /// exceptions included).
    ///
    /// # Errors
    /// [`GeoError::InvalidGrid`] for latitudes outside the UTM range.
    pub fn from_coordinate(coordinate: &Coordinate) -> Result<Self> {
        let lat = coordinate.latitude();
        let lon = coordinate.longitude();
        let band = band_for_latitude(lat)
            .ok_or_else(|| GeoError::grid(format!("Latitude {lat} is outside UTM coverage")))?;
        let zone = zone_for(lat, lon);
        let (easting, northing) = forward(lat, lon, central_meridian(zone));
        Ok(Self {
            zone,
            band,
            easting,
            northing,
        })
    }

    /// Inverse projection back to WGS84.
    ///
    /// # Errors
    /// [`GeoError::InvalidGrid`] when the result lands more than one band away
    /// from the declared band letter, or any error of [`Coordinate::new`].
    pub fn to_coordinate(&self) -> Result<Coordinate> {
        let y = if self.is_northern() {
            self.northing
        } else {
            self.northing - FALSE_NORTHING_SOUTH
        };
        let (lat, lon) = inverse(self.easting, y, central_meridian(self.zone));
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GeoError::grid(format!("{self} does not project")));
        }

        let declared = band_index(self.band);
        let actual = band_for_latitude(lat.clamp(MIN_LATITUDE, MAX_LATITUDE)).and_then(band_index);
        match (declared, actual) {
            (Some(declared), Some(actual)) if declared.abs_diff(actual) <= 1 => {}
            _ => {
                return Err(GeoError::grid(format!(
                    "{self} resolves to latitude {lat:.4}, outside band {}",
                    self.band
                )))
            }
        }

        Coordinate::new(lat, normalize_longitude(lon))
    }

    /// Zone number (1-60).
    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Latitude band letter.
    pub fn band(&self) -> char {
        self.band
    }

    /// Easting in metres including the 500 km false easting.
    pub fn easting(&self) -> f64 {
        self.easting
    }

    /// Northing in metres, southern bands include the 10 000 km false northing.
    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Bands `N` and above are north of the equator.
    pub fn is_northern(&self) -> bool {
        self.band >= 'N'
    }
}

impl fmt::Display for Utm {
    /// `33U 458657 5545464`, metres rounded to the nearest integer.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {:.0} {:.0}",
            self.zone, self.band, self.easting, self.northing
        )
    }
}

/// Band letter covering the latitude, `None` outside -80..=84.
pub fn band_for_latitude(lat: f64) -> Option<char> {
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (((lat - MIN_LATITUDE) / 8.0).floor() as usize).min(BAND_LETTERS.len() - 1);
    BAND_LETTERS.chars().nth(index)
}

fn band_index(band: char) -> Option<u8> {
    BAND_LETTERS
        .chars()
        .position(|c| c == band)
        .and_then(|i| u8::try_from(i).ok())
}

/// Standard zone number including the Norway and Svalbard exceptions.
pub fn zone_for(lat: f64, lon: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut zone = (((lon + 180.0) / 6.0).floor() as u8 % 60) + 1;

    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        zone = 32;
    }
    if (72.0..=84.0).contains(&lat) {
        zone = match lon {
            l if (0.0..9.0).contains(&l) => 31,
            l if (9.0..21.0).contains(&l) => 33,
            l if (21.0..33.0).contains(&l) => 35,
            l if (33.0..42.0).contains(&l) => 37,
            _ => zone,
        };
    }
    zone
}

fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

fn normalize_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

fn meridian_arc(phi: f64) -> f64 {
    SEMI_MAJOR_AXIS
        * ((1.0 - E2 / 4.0 - 3.0 * E4 / 64.0 - 5.0 * E6 / 256.0) * phi
            - (3.0 * E2 / 8.0 + 3.0 * E4 / 32.0 + 45.0 * E6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * E4 / 256.0 + 45.0 * E6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * E6 / 3072.0) * (6.0 * phi).sin())
}

fn forward(lat: f64, lon: f64, lon0: f64) -> (f64, f64) {
    let phi = lat.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = SEMI_MAJOR_AXIS / (1.0 - E2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = EP2 * cos_phi * cos_phi;
    let a = cos_phi * (lon - lon0).to_radians();
    let m = meridian_arc(phi);

    let easting = SCALE_FACTOR
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * EP2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut northing = SCALE_FACTOR
        * (m + n
            * tan_phi
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * EP2) * a.powi(6) / 720.0));
    if lat < 0.0 {
        northing += FALSE_NORTHING_SOUTH;
    }

    (easting, northing)
}

fn inverse(easting: f64, y: f64, lon0: f64) -> (f64, f64) {
    let x = easting - FALSE_EASTING;
    let m = y / SCALE_FACTOR;
    let mu = m / (SEMI_MAJOR_AXIS * (1.0 - E2 / 4.0 - 3.0 * E4 / 64.0 - 5.0 * E6 / 256.0));

    let e1 = (1.0 - (1.0 - E2).sqrt()) / (1.0 + (1.0 - E2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let n1 = SEMI_MAJOR_AXIS / (1.0 - E2 * sin_phi1 * sin_phi1).sqrt();
    let t1 = tan_phi1 * tan_phi1;
    let c1 = EP2 * cos_phi1 * cos_phi1;
    let r1 = SEMI_MAJOR_AXIS * (1.0 - E2) / (1.0 - E2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * SCALE_FACTOR);

    let phi = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * EP2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * EP2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let lambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * EP2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos_phi1;

    (phi.to_degrees(), lon0 + lambda.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_prague_forward() {
        let utm = Utm::from_coordinate(&coord(50.087451, 14.420671)).unwrap();
        assert_eq!(utm.zone(), 33);
        assert_eq!(utm.band(), 'U');
        assert!((utm.easting() - 458_557.0).abs() < 150.0, "easting {}", utm.easting());
        assert!((utm.northing() - 5_548_514.0).abs() < 150.0, "northing {}", utm.northing());
    }

    #[test]
    fn test_equator_on_central_meridian() {
        let utm = Utm::from_coordinate(&coord(0.0, 15.0)).unwrap();
        assert_eq!(utm.zone(), 33);
        assert!((utm.easting() - 500_000.0).abs() < 1e-6);
        assert!(utm.northing().abs() < 1e-6);
    }

    #[test]
    fn test_southern_false_northing() {
        let utm = Utm::from_coordinate(&coord(-33.8688, 151.2093)).unwrap();
        assert_eq!(utm.zone(), 56);
        assert_eq!(utm.band(), 'H');
        assert!(!utm.is_northern());
        assert!(utm.northing() > 6_000_000.0 && utm.northing() < 6_500_000.0);
    }

    #[test]
    fn test_zone_exceptions() {
        assert_eq!(zone_for(60.0, 5.0), 32);
        assert_eq!(zone_for(78.0, 15.0), 33);
        assert_eq!(zone_for(78.0, 35.0), 37);
        assert_eq!(zone_for(50.0, 180.0), 1);
    }

    #[test]
    fn test_band_letters() {
        assert_eq!(band_for_latitude(-80.0), Some('C'));
        assert_eq!(band_for_latitude(0.0), Some('N'));
        assert_eq!(band_for_latitude(50.08), Some('U'));
        assert_eq!(band_for_latitude(84.0), Some('X'));
        assert_eq!(band_for_latitude(-80.1), None);
        assert_eq!(band_for_latitude(84.1), None);
    }

    #[test]
    fn test_outside_coverage() {
        assert!(Utm::from_coordinate(&coord(85.0, 0.0)).is_err());
        assert!(Utm::from_coordinate(&coord(-81.0, 0.0)).is_err());
    }

    #[test]
    fn test_new_validates_components() {
        assert!(Utm::new(0, 'U', 458_657.0, 5_548_365.0).is_err());
        assert!(Utm::new(61, 'U', 458_657.0, 5_548_365.0).is_err());
        assert!(Utm::new(33, 'I', 458_657.0, 5_548_365.0).is_err());
        assert!(Utm::new(33, 'U', 58_657.0, 5_548_365.0).is_err());
        assert!(Utm::new(33, 'U', 458_657.0, 15_548_365.0).is_err());
        assert!(Utm::new(33, 'u', 458_657.0, 5_548_365.0).is_ok());
    }

    #[test]
    fn test_band_mismatch_is_invalid() {
        // Northing of Prague declared in a southern band
        let utm = Utm::new(33, 'C', 458_657.0, 5_548_365.0).unwrap();
        assert!(utm.to_coordinate().is_err());
    }

    #[test]
    fn test_display() {
        let utm = Utm::new(33, 'U', 458_657.4, 5_548_364.6).unwrap();
        assert_eq!(utm.to_string(), "33U 458657 5548365");
    }

    proptest! {
        #[test]
        fn prop_round_trip(lat in -79.0f64..83.0, lon in -179.9f64..179.9) {
            let original = coord(lat, lon);
            let utm = Utm::from_coordinate(&original).unwrap();
            let back = utm.to_coordinate().unwrap();
            prop_assert!((back.latitude() - lat).abs() < 1e-5, "lat {} -> {}", lat, back.latitude());
            prop_assert!((back.longitude() - lon).abs() < 1e-5, "lon {} -> {}", lon, back.longitude());
        }
    }
}
