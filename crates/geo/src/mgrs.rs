//! Military Grid Reference System (and its civil twin, USNG).
//!
//! A reference is a UTM zone and band, a two-letter 100 km square
//! identifier and 1-5 digits each of easting and northing inside that
//! square. References are truncated, never rounded, so a reference names
//! a square and [`Mgrs::to_coordinate`] returns its centre.

use crate::utm::{Utm, BAND_LETTERS};
use crate::{Coordinate, GeoError, Result};
use std::fmt;
use std::str::FromStr;

/// Column letters, cycling every three zones.
const COLUMN_SETS: [&str; 3] = ["ABCDEFGH", "JKLMNPQR", "STUVWXYZ"];

/// Row letters, offset by five letters in even zones.
const ROW_SETS: [&str; 2] = ["ABCDEFGHJKLMNPQRSTUV", "FGHJKLMNPQRSTUVABCDE"];

/// Row letters repeat every 2 000 km of northing.
const ROW_CYCLE: f64 = 2_000_000.0;

/// Lowest northing (metres, 100 km floor) found in each band, C through X.
const BAND_MIN_NORTHING: [f64; 20] = [
    1_100_000.0, 2_000_000.0, 2_800_000.0, 3_700_000.0, 4_600_000.0, 5_500_000.0, 6_400_000.0,
    7_300_000.0, 8_200_000.0, 9_100_000.0, 0.0, 800_000.0, 1_700_000.0, 2_600_000.0, 3_500_000.0,
    4_400_000.0, 5_300_000.0, 6_200_000.0, 7_000_000.0, 7_900_000.0,
];

/// Highest supported number of digits per axis (1 metre).
pub const MAX_PRECISION: u8 = 5;

/// A parsed or computed MGRS reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mgrs {
    zone: u8,
    band: char,
    column: char,
    row: char,
    easting: u32,
    northing: u32,
    precision: u8,
}

impl Mgrs {
    /// Builds a reference from its parts.
    ///
    /// `easting` and `northing` are the digit groups read as integers, so
    /// with `precision` 3 they are hundreds of metres inside the square.
    ///
    /// # Errors
    /// [`GeoError::InvalidGrid`] when a letter does not belong to the zone or a
    /// digit group does not fit the precision.
    pub fn new(
        zone: u8,
        band: char,
        column: char,
        row: char,
        easting: u32,
        northing: u32,
        precision: u8,
    ) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(GeoError::grid(format!("Zone {zone} is outside 1-60")));
        }
        let band = band.to_ascii_uppercase();
        let column = column.to_ascii_uppercase();
        let row = row.to_ascii_uppercase();
        if !BAND_LETTERS.contains(band) {
            return Err(GeoError::grid(format!("Unknown latitude band '{band}'")));
        }
        if !column_set(zone).contains(column) {
            return Err(GeoError::grid(format!(
                "Column '{column}' is not used in zone {zone}"
            )));
        }
        if !row_set(zone).contains(row) {
            return Err(GeoError::grid(format!("Row '{row}' is not used in zone {zone}")));
        }
        if !(1..=MAX_PRECISION).contains(&precision) {
            return Err(GeoError::grid(format!(
                "Precision must be 1-{MAX_PRECISION} digits, got {precision}"
            )));
        }
        let limit = 10u32.pow(u32::from(precision));
        if easting >= limit || northing >= limit {
            return Err(GeoError::grid(format!(
                "Offsets {easting}/{northing} do not fit {precision} digits"
            )));
        }

        Ok(Self {
            zone,
            band,
            column,
            row,
            easting,
            northing,
            precision,
        })
    }

    /// Converts a coordinate, truncating offsets to `precision` digits.
    ///
    /// # Errors
    /// Anything [`Utm::from_coordinate`] rejects, or a precision outside 1-5.
    pub fn from_coordinate(coordinate: &Coordinate, precision: u8) -> Result<Self> {
        if !(1..=MAX_PRECISION).contains(&precision) {
            return Err(GeoError::grid(format!(
                "Precision must be 1-{MAX_PRECISION} digits, got {precision}"
            )));
        }
        let utm = Utm::from_coordinate(coordinate)?;
        let zone = utm.zone();

        let column_index = hundred_km(utm.easting())
            .checked_sub(1)
            .ok_or_else(|| GeoError::grid("Easting west of the first column"))?;
        let row_index = hundred_km(utm.northing()) % 20;
        let column = nth_letter(column_set(zone), column_index)?;
        let row = nth_letter(row_set(zone), row_index)?;

        let divisor = 10f64.powi(i32::from(MAX_PRECISION - precision));
        Ok(Self {
            zone,
            band: utm.band(),
            column,
            row,
            easting: truncate_offset(utm.easting(), divisor),
            northing: truncate_offset(utm.northing(), divisor),
            precision,
        })
    }

    /// Centre of the square named by this reference.
    ///
    /// # Errors
    /// [`GeoError::InvalidGrid`] when the square lies outside its band.
    pub fn to_coordinate(&self) -> Result<Coordinate> {
        let column_index = column_set(self.zone)
            .chars()
            .position(|c| c == self.column)
            .ok_or_else(|| GeoError::grid(format!("Column '{}' not in zone", self.column)))?;
        let row_index = row_set(self.zone)
            .chars()
            .position(|c| c == self.row)
            .ok_or_else(|| GeoError::grid(format!("Row '{}' not in zone", self.row)))?;
        let band_index = BAND_LETTERS
            .chars()
            .position(|c| c == self.band)
            .ok_or_else(|| GeoError::grid(format!("Unknown band '{}'", self.band)))?;

        let unit = 10f64.powi(i32::from(MAX_PRECISION - self.precision));
        let half = unit / 2.0;

        let easting = (column_index as f64 + 1.0) * 100_000.0 + f64::from(self.easting) * unit + half;

        let min_northing = BAND_MIN_NORTHING[band_index];
        let mut square_northing = row_index as f64 * 100_000.0;
        while square_northing < min_northing {
            square_northing += ROW_CYCLE;
        }
        let northing = square_northing + f64::from(self.northing) * unit + half;

        Utm::new(self.zone, self.band, easting, northing)?.to_coordinate()
    }

    /// Zone number.
    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Latitude band letter.
    pub fn band(&self) -> char {
        self.band
    }

    /// 100 km square letters, column then row.
    pub fn square(&self) -> (char, char) {
        (self.column, self.row)
    }

    /// Digits per axis.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Spaced USNG rendering: `33U VR 58557 48514`.
    pub fn to_spaced_string(&self) -> String {
        format!(
            "{}{} {}{} {:0width$} {:0width$}",
            self.zone,
            self.band,
            self.column,
            self.row,
            self.easting,
            self.northing,
            width = usize::from(self.precision)
        )
    }
}

impl fmt::Display for Mgrs {
    /// Compact MGRS rendering: `33UVR5855748514`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{:0width$}{:0width$}",
            self.zone,
            self.band,
            self.column,
            self.row,
            self.easting,
            self.northing,
            width = usize::from(self.precision)
        )
    }
}

impl FromStr for Mgrs {
    type Err = GeoError;

    /// Accepts compact and spaced forms. Whitespace is ignored entirely.
    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let zone_len = compact.chars().take_while(char::is_ascii_digit).count();
        if !(1..=2).contains(&zone_len) {
            return Err(GeoError::format(format!("'{s}' does not start with a zone number")));
        }
        let zone: u8 = compact[..zone_len]
            .parse()
            .map_err(|_| GeoError::format(format!("Invalid zone in '{s}'")))?;

        let mut letters = compact[zone_len..].chars();
        let (Some(band), Some(column), Some(row)) = (letters.next(), letters.next(), letters.next())
        else {
            return Err(GeoError::format(format!("'{s}' is missing grid letters")));
        };

        let digits = letters.as_str();
        if digits.is_empty() || digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GeoError::format(format!(
                "'{s}' needs an even number of offset digits"
            )));
        }
        let half = digits.len() / 2;
        let precision = u8::try_from(half)
            .map_err(|_| GeoError::format(format!("Too many digits in '{s}'")))?;
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| GeoError::format(format!("Invalid offset '{part}'")))
        };

        Mgrs::new(
            zone,
            band,
            column,
            row,
            parse(&digits[..half])?,
            parse(&digits[half..])?,
            precision,
        )
    }
}

fn column_set(zone: u8) -> &'static str {
    COLUMN_SETS[usize::from((zone - 1) % 3)]
}

fn row_set(zone: u8) -> &'static str {
    ROW_SETS[usize::from((zone - 1) % 2)]
}

fn nth_letter(set: &str, index: usize) -> Result<char> {
    set.chars()
        .nth(index)
        .ok_or_else(|| GeoError::grid(format!("No grid letter at index {index}")))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hundred_km(metres: f64) -> usize {
    (metres / 100_000.0).floor() as usize
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_offset(metres: f64, divisor: f64) -> u32 {
    ((metres % 100_000.0) / divisor).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prague() -> Coordinate {
        Coordinate::new(50.087451, 14.420671).unwrap()
    }

    #[test]
    fn test_square_letters() {
        let mgrs = Mgrs::from_coordinate(&prague(), 5).unwrap();
        assert_eq!(mgrs.zone(), 33);
        assert_eq!(mgrs.band(), 'U');
        assert_eq!(mgrs.square(), ('V', 'R'));
    }

    #[test]
    fn test_precision_truncates() {
        let full = Mgrs::from_coordinate(&prague(), 5).unwrap();
        let coarse = Mgrs::from_coordinate(&prague(), 2).unwrap();
        assert_eq!(coarse.easting, full.easting / 1000);
        assert_eq!(coarse.northing, full.northing / 1000);
        assert_eq!(coarse.to_string().len(), "33UVR".len() + 4);
    }

    #[test]
    fn test_display_forms() {
        let mgrs = Mgrs::new(33, 'U', 'V', 'R', 5855, 48514, 5).unwrap();
        assert_eq!(mgrs.to_string(), "33UVR0585548514");
        assert_eq!(mgrs.to_spaced_string(), "33U VR 05855 48514");
    }

    #[test]
    fn test_parse_compact_and_spaced() {
        let compact: Mgrs = "33UVR5855748514".parse().unwrap();
        let spaced: Mgrs = "33U VR 58557 48514".parse().unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(compact.precision(), 5);

        let lower: Mgrs = "33uvr5848".parse().unwrap();
        assert_eq!(lower.precision(), 2);
        assert_eq!(lower.square(), ('V', 'R'));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("33UVR585574851".parse::<Mgrs>().is_err());
        assert!("33UVR".parse::<Mgrs>().is_err());
        assert!("UVR1234".parse::<Mgrs>().is_err());
        assert!("33UVR123456123456".parse::<Mgrs>().is_err());
        // column 'A' belongs to zones 1, 4, 7, ...
        assert!("33UAR1234".parse::<Mgrs>().is_err());
        assert!("33IVR1234".parse::<Mgrs>().is_err());
    }

    #[test]
    fn test_inverse_returns_square_centre() {
        let mgrs = Mgrs::from_coordinate(&prague(), 5).unwrap();
        let back = mgrs.to_coordinate().unwrap();
        assert!((back.latitude() - 50.087451).abs() < 2e-5);
        assert!((back.longitude() - 14.420671).abs() < 2e-5);
    }

    #[test]
    fn test_low_precision_inverse_stays_near() {
        let mgrs = Mgrs::from_coordinate(&prague(), 1).unwrap();
        let back = mgrs.to_coordinate().unwrap();
        // 10 km square: centre is at most ~7 km away
        assert!((back.latitude() - 50.087451).abs() < 0.1);
        assert!((back.longitude() - 14.420671).abs() < 0.1);
    }

    #[test]
    fn test_southern_hemisphere() {
        let sydney = Coordinate::new(-33.8688, 151.2093).unwrap();
        let mgrs = Mgrs::from_coordinate(&sydney, 5).unwrap();
        assert_eq!(mgrs.zone(), 56);
        assert_eq!(mgrs.band(), 'H');
        let back = mgrs.to_coordinate().unwrap();
        assert!((back.latitude() + 33.8688).abs() < 2e-5);
        assert!((back.longitude() - 151.2093).abs() < 2e-5);
    }

    #[test]
    fn test_invalid_precision() {
        assert!(Mgrs::from_coordinate(&prague(), 0).is_err());
        assert!(Mgrs::from_coordinate(&prague(), 6).is_err());
        assert!(Mgrs::new(33, 'U', 'V', 'R', 100, 1, 2).is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_a_metre(lat in -79.0f64..83.0, lon in -179.9f64..179.9) {
            let original = Coordinate::new(lat, lon).unwrap();
            let mgrs = Mgrs::from_coordinate(&original, 5).unwrap();
            let reparsed: Mgrs = mgrs.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, mgrs);
            let back = reparsed.to_coordinate().unwrap();
            prop_assert!((back.latitude() - lat).abs() < 2e-5);
            prop_assert!((back.longitude() - lon).abs() < 2e-5 / lat.to_radians().cos().max(0.1));
        }
    }
}
