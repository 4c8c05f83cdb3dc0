//! Geohash encoding.

use crate::{Coordinate, GeoError, Result};

const ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Default length, roughly 4 cm of precision.
pub const DEFAULT_LENGTH: usize = 12;

/// Encodes a coordinate into a geohash of `length` characters.
pub fn encode(coordinate: &Coordinate, length: usize) -> String {
    let mut lat_range = (-90.0, 90.0);
    let mut lon_range = (-180.0, 180.0);
    let mut hash = String::with_capacity(length);
    let mut even_bit = true;

    while hash.len() < length {
        let mut index = 0usize;
        for _ in 0..5 {
            let (range, value) = if even_bit {
                (&mut lon_range, coordinate.longitude())
            } else {
                (&mut lat_range, coordinate.latitude())
            };
            let mid = (range.0 + range.1) / 2.0;
            index <<= 1;
            if value >= mid {
                index |= 1;
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
        hash.push(char::from(ALPHABET[index]));
    }
    hash
}

/// Decodes a geohash into the centre of its cell.
///
/// # Errors
/// [`GeoError::InvalidFormat`] for empty input or characters outside the
/// geohash alphabet (`a`, `i`, `l` and `o` are not used).
///
/// ```
/// use betterlocation_geo::geohash;
///
/// let c = geohash::decode("u4pruydqqvj").unwrap();
/// assert!((c.latitude() - 57.64911).abs() < 1e-5);
/// assert!((c.longitude() - 10.40744).abs() < 1e-5);
/// ```
pub fn decode(hash: &str) -> Result<Coordinate> {
    if hash.is_empty() {
        return Err(GeoError::format("Geohash is empty"));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for c in hash.chars() {
        let lower = c.to_ascii_lowercase();
        let index = ALPHABET
            .iter()
            .position(|&b| char::from(b) == lower)
            .ok_or_else(|| GeoError::format(format!("Invalid geohash character '{c}'")))?;
        for shift in (0..5).rev() {
            let bit = (index >> shift) & 1 == 1;
            let range = if even_bit { &mut lon_range } else { &mut lat_range };
            let mid = (range.0 + range.1) / 2.0;
            if bit {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
    }

    Coordinate::new(
        (lat_range.0 + lat_range.1) / 2.0,
        (lon_range.0 + lon_range.1) / 2.0,
    )
}

/// True when every character belongs to the geohash alphabet.
pub fn is_valid(hash: &str) -> bool {
    !hash.is_empty()
        && hash
            .bytes()
            .all(|b| ALPHABET.contains(&b.to_ascii_lowercase()))
}
