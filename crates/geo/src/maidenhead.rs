//! Maidenhead locator system (amateur radio grid squares).
//!
//! Locators are built from up to seven character pairs: field (`A`-`R`),
//! square (`0`-`9`), subsquare (`a`-`x`), then extended pairs alternating
//! digits and letters in the same way. Each pair narrows the previous cell.
//! Seven pairs put the cell centre within 1e-6° of any point.

use crate::{Coordinate, GeoError, Result};

/// Longest supported locator, in characters.
pub const MAX_LENGTH: usize = 14;

#[derive(Clone, Copy)]
struct Level {
    divisions: u32,
    lon_size: f64,
    lat_size: f64,
    letter: bool,
}

const LEVELS: [Level; 7] = [
    Level { divisions: 18, lon_size: 20.0, lat_size: 10.0, letter: true },
    Level { divisions: 10, lon_size: 2.0, lat_size: 1.0, letter: false },
    Level { divisions: 24, lon_size: 2.0 / 24.0, lat_size: 1.0 / 24.0, letter: true },
    Level { divisions: 10, lon_size: 2.0 / 240.0, lat_size: 1.0 / 240.0, letter: false },
    Level { divisions: 24, lon_size: 2.0 / 5760.0, lat_size: 1.0 / 5760.0, letter: true },
    Level { divisions: 10, lon_size: 2.0 / 57_600.0, lat_size: 1.0 / 57_600.0, letter: false },
    Level { divisions: 24, lon_size: 2.0 / 1_382_400.0, lat_size: 1.0 / 1_382_400.0, letter: true },
];

/// Decodes a locator into the centre of its cell.
///
/// Letters are case-insensitive.
///
/// # Errors
/// [`GeoError::InvalidFormat`] for odd lengths, lengths outside 2-14 or
/// characters outside the range of their pair.
///
/// ```
/// use betterlocation_geo::maidenhead;
///
/// let centre = maidenhead::decode("JO70").unwrap();
/// assert_eq!((centre.latitude(), centre.longitude()), (50.5, 15.0));
/// ```
pub fn decode(locator: &str) -> Result<Coordinate> {
    let bytes = locator.as_bytes();
    if bytes.len() < 2 || bytes.len() > MAX_LENGTH || bytes.len() % 2 != 0 {
        return Err(GeoError::format(format!(
            "Locator '{locator}' must have an even number of characters, 2 to {MAX_LENGTH}"
        )));
    }

    let mut lon = -180.0;
    let mut lat = -90.0;
    let mut last = LEVELS[0];
    for (pair, level) in bytes.chunks_exact(2).zip(LEVELS) {
        let x = index_of(pair[0], level).ok_or_else(|| invalid_char(locator, pair[0]))?;
        let y = index_of(pair[1], level).ok_or_else(|| invalid_char(locator, pair[1]))?;
        lon += f64::from(x) * level.lon_size;
        lat += f64::from(y) * level.lat_size;
        last = level;
    }

    Coordinate::new(lat + last.lat_size / 2.0, lon + last.lon_size / 2.0)
}

/// Encodes a coordinate with `pairs` character pairs (1-7).
///
/// # Errors
/// [`GeoError::InvalidFormat`] when `pairs` is outside 1-7.
pub fn encode(coordinate: &Coordinate, pairs: usize) -> Result<String> {
    if !(1..=LEVELS.len()).contains(&pairs) {
        return Err(GeoError::format(format!(
            "Locator precision must be 1-{} pairs, got {pairs}",
            LEVELS.len()
        )));
    }

    let mut lon = coordinate.longitude() + 180.0;
    let mut lat = coordinate.latitude() + 90.0;
    let mut locator = String::with_capacity(pairs * 2);
    for (depth, level) in LEVELS[..pairs].iter().enumerate() {
        let x = cell_index(lon, level.lon_size, level.divisions);
        let y = cell_index(lat, level.lat_size, level.divisions);
        lon -= f64::from(x) * level.lon_size;
        lat -= f64::from(y) * level.lat_size;
        locator.push(symbol(x, level, depth));
        locator.push(symbol(y, level, depth));
    }
    Ok(locator)
}

fn index_of(byte: u8, level: Level) -> Option<u32> {
    let index = if level.letter {
        u32::from(byte.to_ascii_uppercase().checked_sub(b'A')?)
    } else {
        u32::from(byte.checked_sub(b'0')?)
    };
    (index < level.divisions).then_some(index)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_index(offset: f64, size: f64, divisions: u32) -> u32 {
    // 180° and 90° sit on the far edge of the last cell
    ((offset / size).floor().max(0.0) as u32).min(divisions - 1)
}

fn symbol(index: u32, level: &Level, depth: usize) -> char {
    let base = match (level.letter, depth) {
        (true, 0) => 'A',
        (true, _) => 'a',
        (false, _) => '0',
    };
    char::from_u32(u32::from(base) + index).unwrap_or(base)
}

fn invalid_char(locator: &str, byte: u8) -> GeoError {
    GeoError::format(format!(
        "Locator '{locator}' has invalid character '{}'",
        char::from(byte)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_prague() {
        let prague = Coordinate::new(50.087451, 14.420671).unwrap();
        assert_eq!(encode(&prague, 3).unwrap(), "JO70fc");
        assert_eq!(encode(&prague, 5).unwrap(), "JO70fc00lx");
        assert_eq!(encode(&prague, 7).unwrap().len(), 14);
        assert!(encode(&prague, 7).unwrap().starts_with("JO70fc00lx"));
        assert!(encode(&prague, 8).is_err());
    }

    #[test]
    fn test_decode_is_cell_centre() {
        let c = decode("JO70fc").unwrap();
        assert!((c.longitude() - (14.0 + 5.0 / 12.0 + 1.0 / 24.0)).abs() < 1e-9);
        assert!((c.latitude() - (50.0 + 2.0 / 24.0 + 1.0 / 48.0)).abs() < 1e-9);
    }

    #[test]
    fn test_decode_case_insensitive() {
        assert_eq!(decode("jo70FC").unwrap(), decode("JO70fc").unwrap());
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode("").is_err());
        assert!(decode("J").is_err());
        assert!(decode("JO7").is_err());
        assert!(decode("SO70").is_err()); // field letters stop at R
        assert!(decode("JO7a").is_err());
        assert!(decode("JO70yc").is_err()); // subsquares stop at x
        assert!(decode("JO70fc00aa00aa00").is_err());
        assert!(decode("JO70fc00aaa0").is_err()); // sixth pair is digits
    }

    #[test]
    fn test_edges() {
        let north_east = Coordinate::new(90.0, 180.0).unwrap();
        assert_eq!(encode(&north_east, 2).unwrap(), "RR99");
        let south_west = Coordinate::new(-90.0, -180.0).unwrap();
        assert_eq!(encode(&south_west, 3).unwrap(), "AA00aa");
    }

    #[test]
    fn test_full_precision_prague() {
        let prague = Coordinate::new(50.087451, 14.420671).unwrap();
        let back = decode(&encode(&prague, 7).unwrap()).unwrap();
        assert!((back.latitude() - 50.087451).abs() <= 1e-6);
        assert!((back.longitude() - 14.420671).abs() <= 1e-6);
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_cell(lat in -89.9f64..89.9, lon in -179.9f64..179.9) {
            let original = Coordinate::new(lat, lon).unwrap();
            let back = decode(&encode(&original, 5).unwrap()).unwrap();
            // extended subsquare: 2/5760° by 1/5760°, centre is half a cell away at most
            prop_assert!((back.longitude() - lon).abs() <= 1.0 / 5760.0 + 1e-9);
            prop_assert!((back.latitude() - lat).abs() <= 0.5 / 5760.0 + 1e-9);
        }

        #[test]
        fn prop_full_precision_within_1e5(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let original = Coordinate::new(lat, lon).unwrap();
            let back = decode(&encode(&original, 7).unwrap()).unwrap();
            prop_assert!((back.longitude() - lon).abs() <= 1e-5);
            prop_assert!((back.latitude() - lat).abs() <= 1e-5);
        }
    }
}
