//! Hemisphere markers and resolution of loosely written coordinate pairs.
//!
//! Free text puts hemisphere symbols (`N`, `S`, `E`, `W`, `+`, `-`) before or
//! after each number, sometimes on both sides, and sometimes writes the
//! longitude first. [`resolve_pair`] turns the raw pieces of one matched pair
//! into a [`Coordinate`].

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// North/south
    Latitude,
    /// East/west
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Cardinal hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Sign multiplier: `1.0` for north/east, `-1.0` for south/west.
    #[inline]
    pub fn flip(self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }

    /// Axis this hemisphere belongs to.
    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    /// Single letter symbol.
    pub fn symbol(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    /// Parses a letter symbol (case insensitive).
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Hemisphere of a signed decimal value on the given axis.
    pub fn for_value(axis: Axis, value: f64) -> Self {
        match (axis, value.is_sign_negative() && value != 0.0) {
            (Axis::Latitude, false) => Hemisphere::North,
            (Axis::Latitude, true) => Hemisphere::South,
            (Axis::Longitude, false) => Hemisphere::East,
            (Axis::Longitude, true) => Hemisphere::West,
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Raw pieces of one number of a matched pair, exactly as captured.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawAxis<'a> {
    /// Symbol written before the number, `""` when absent
    pub prefix: &'a str,
    /// Whether whitespace separates the prefix symbol from the number
    pub prefix_spaced: bool,
    /// Unsigned magnitude in decimal degrees
    pub magnitude: f64,
    /// Symbol written after the number, `""` when absent
    pub suffix: &'a str,
}

impl<'a> RawAxis<'a> {
    /// Creates a raw axis without any hemisphere symbols.
    pub fn new(magnitude: f64) -> Self {
        Self {
            magnitude,
            ..Self::default()
        }
    }

    /// Sets the symbol written before the number.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &'a str, spaced: bool) -> Self {
        self.prefix = prefix;
        self.prefix_spaced = spaced;
        self
    }

    /// Sets the symbol written after the number.
    #[must_use]
    pub fn with_suffix(mut self, suffix: &'a str) -> Self {
        self.suffix = suffix;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy)]
struct Sides<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> Sides<'a> {
    fn both(&self) -> bool {
        !self.prefix.is_empty() && !self.suffix.is_empty()
    }

    fn single(&self) -> Option<Side> {
        match (self.prefix.is_empty(), self.suffix.is_empty()) {
            (false, true) => Some(Side::Prefix),
            (true, false) => Some(Side::Suffix),
            _ => None,
        }
    }

    /// Clears the side the sibling does not use.
    fn adopt(&mut self, sibling: Side) {
        match sibling {
            Side::Prefix => self.suffix = "",
            Side::Suffix => self.prefix = "",
        }
    }

    fn symbol(&self) -> &'a str {
        if self.prefix.is_empty() {
            self.suffix
        } else {
            self.prefix
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Neutral { negative: bool },
    Letter(Hemisphere),
}

impl Marker {
    fn parse(symbol: &str) -> Result<Self> {
        match symbol {
            "" | "+" => Ok(Marker::Neutral { negative: false }),
            "-" => Ok(Marker::Neutral { negative: true }),
            other => {
                let mut chars = other.chars();
                match (chars.next().and_then(Hemisphere::from_symbol), chars.next()) {
                    (Some(hemisphere), None) => Ok(Marker::Letter(hemisphere)),
                    _ => Err(GeoError::format(format!("Unknown hemisphere symbol '{other}'"))),
                }
            }
        }
    }

    fn belongs_to(self, axis: Axis) -> bool {
        matches!(self, Marker::Letter(h) if h.axis() == axis)
    }

    fn resolve(self, axis: Axis) -> Hemisphere {
        match self {
            Marker::Letter(hemisphere) => hemisphere,
            Marker::Neutral { negative } => match (axis, negative) {
                (Axis::Latitude, false) => Hemisphere::North,
                (Axis::Latitude, true) => Hemisphere::South,
                (Axis::Longitude, false) => Hemisphere::East,
                (Axis::Longitude, true) => Hemisphere::West,
            },
        }
    }
}

/// Resolves the hemisphere symbols of a matched pair into a coordinate.
///
/// `first` and `second` are the two numbers in the order they were written.
///
/// 1. A symbol on both sides of one number is an error unless the sibling
///    number uses exactly one side; then this number follows the sibling and
///    the symbol on the other side is dropped.
/// 2. A `-` glued to the first number is its numeric sign and does not count
///    as a prefix symbol. With whitespace in between it is a hemisphere marker.
///    The second number always treats `-` as a marker.
/// 3. `""`, `+` and `-` resolve to the axis of the final slot; `N`/`S` and
///    `E`/`W` are fixed. A longitude letter on the first number or a latitude
///    letter on the second means the pair was written longitude first.
/// 4. Swapped pairs exchange markers and magnitudes.
/// 5. A latitude slot left with `E`/`W`, or a longitude slot with `N`/`S`,
///    means both numbers used the same axis.
///
/// # Errors
/// [`GeoError::HemisphereDefinedTwice`], [`GeoError::SameAxisHemisphere`],
/// [`GeoError::InvalidFormat`] for unknown symbols, and the out-of-range errors
/// of [`Coordinate::new`].
pub fn resolve_pair(first: RawAxis<'_>, second: RawAxis<'_>) -> Result<Coordinate> {
    let first_signed = first.prefix == "-" && !first.prefix_spaced;
    let mut first_magnitude = if first_signed {
        -first.magnitude
    } else {
        first.magnitude
    };
    let mut second_magnitude = second.magnitude;

    let mut first_sides = Sides {
        prefix: if first_signed { "" } else { first.prefix },
        suffix: first.suffix,
    };
    let mut second_sides = Sides {
        prefix: second.prefix,
        suffix: second.suffix,
    };

    if first_sides.both() {
        match second_sides.single() {
            Some(side) => first_sides.adopt(side),
            None => return Err(GeoError::HemisphereDefinedTwice(1)),
        }
    }
    if second_sides.both() {
        match first_sides.single() {
            Some(side) => second_sides.adopt(side),
            None => return Err(GeoError::HemisphereDefinedTwice(2)),
        }
    }

    let mut first_marker = Marker::parse(first_sides.symbol())?;
    let mut second_marker = Marker::parse(second_sides.symbol())?;

    let swap = first_marker.belongs_to(Axis::Longitude) || second_marker.belongs_to(Axis::Latitude);
    if swap {
        mem::swap(&mut first_marker, &mut second_marker);
        mem::swap(&mut first_magnitude, &mut second_magnitude);
    }

    let lat_hemisphere = first_marker.resolve(Axis::Latitude);
    let lon_hemisphere = second_marker.resolve(Axis::Longitude);
    if lat_hemisphere.axis() != Axis::Latitude {
        return Err(GeoError::SameAxisHemisphere(Axis::Longitude));
    }
    if lon_hemisphere.axis() != Axis::Longitude {
        return Err(GeoError::SameAxisHemisphere(Axis::Latitude));
    }

    Coordinate::new(
        lat_hemisphere.flip() * first_magnitude,
        lon_hemisphere.flip() * second_magnitude,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair(first: RawAxis<'_>, second: RawAxis<'_>) -> Result<(f64, f64)> {
        resolve_pair(first, second).map(|c| (c.latitude(), c.longitude()))
    }

    #[test]
    fn test_no_symbols() {
        assert_eq!(pair(RawAxis::new(50.1), RawAxis::new(14.2)), Ok((50.1, 14.2)));
    }

    #[test]
    fn test_prefix_letters() {
        let first = RawAxis::new(50.1).with_prefix("S", false);
        let second = RawAxis::new(14.2).with_prefix("W", false);
        assert_eq!(pair(first, second), Ok((-50.1, -14.2)));
    }

    #[test]
    fn test_swapped_axes() {
        let first = RawAxis::new(50.1).with_prefix("E", false);
        let second = RawAxis::new(14.2).with_prefix("N", false);
        assert_eq!(pair(first, second), Ok((14.2, 50.1)));
    }

    #[test]
    fn test_swap_with_one_neutral_slot() {
        let first = RawAxis::new(14.2).with_suffix("W");
        let second = RawAxis::new(50.1);
        assert_eq!(pair(first, second), Ok((50.1, -14.2)));
    }

    #[test]
    fn test_glued_minus_is_numeric_sign() {
        let first = RawAxis::new(50.1).with_prefix("-", false);
        let second = RawAxis::new(14.2);
        assert_eq!(pair(first, second), Ok((-50.1, 14.2)));
    }

    #[test]
    fn test_glued_minus_does_not_count_as_prefix() {
        // "-50.1N" keeps its numeric sign, the suffix is the only marker
        let first = RawAxis::new(50.1).with_prefix("-", false).with_suffix("N");
        let second = RawAxis::new(14.2).with_suffix("E");
        assert_eq!(pair(first, second), Ok((-50.1, 14.2)));
    }

    #[test]
    fn test_spaced_minus_is_marker() {
        let first = RawAxis::new(50.1).with_prefix("-", true);
        let second = RawAxis::new(14.2).with_prefix("-", false);
        assert_eq!(pair(first, second), Ok((-50.1, -14.2)));
    }

    #[test]
    fn test_second_minus_always_counts_as_prefix() {
        // The sibling uses suffixes, so the longitude prefix is dropped
        let first = RawAxis::new(50.1).with_suffix("N");
        let second = RawAxis::new(14.2).with_prefix("-", false).with_suffix("E");
        assert_eq!(pair(first, second), Ok((50.1, 14.2)));
    }

    #[test]
    fn test_twice_defined_follows_sibling_prefix() {
        let first = RawAxis::new(50.1).with_prefix("N", false).with_suffix("S");
        let second = RawAxis::new(14.2).with_prefix("E", false);
        assert_eq!(pair(first, second), Ok((50.1, 14.2)));
    }

    #[test]
    fn test_twice_defined_follows_sibling_suffix() {
        let first = RawAxis::new(50.1).with_prefix("N", false).with_suffix("S");
        let second = RawAxis::new(14.2).with_suffix("W");
        assert_eq!(pair(first, second), Ok((-50.1, -14.2)));
    }

    #[test]
    fn test_twice_defined_without_sibling_hint() {
        let first = RawAxis::new(50.1).with_prefix("N", false).with_suffix("N");
        let second = RawAxis::new(14.2);
        assert_eq!(pair(first, second), Err(GeoError::HemisphereDefinedTwice(1)));

        let first = RawAxis::new(50.1).with_prefix("N", false).with_suffix("N");
        let second = RawAxis::new(14.2).with_prefix("E", false).with_suffix("E");
        assert_eq!(pair(first, second), Err(GeoError::HemisphereDefinedTwice(1)));
    }

    #[test]
    fn test_both_latitude_letters() {
        let first = RawAxis::new(50.1).with_prefix("N", false);
        let second = RawAxis::new(14.2).with_prefix("S", false);
        assert_eq!(pair(first, second), Err(GeoError::SameAxisHemisphere(Axis::Latitude)));
    }

    #[test]
    fn test_both_longitude_letters() {
        let first = RawAxis::new(50.1).with_prefix("E", false);
        let second = RawAxis::new(14.2).with_prefix("W", false);
        assert_eq!(pair(first, second), Err(GeoError::SameAxisHemisphere(Axis::Longitude)));
    }

    #[test]
    fn test_out_of_range_after_resolution() {
        let result = resolve_pair(RawAxis::new(50.1), RawAxis::new(200.5));
        assert_eq!(result, Err(GeoError::LongitudeOutOfRange(200.5)));
    }

    #[test]
    fn test_unknown_symbol() {
        let first = RawAxis::new(50.1).with_prefix("X", false);
        assert!(matches!(
            resolve_pair(first, RawAxis::new(14.2)),
            Err(GeoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_hemisphere_helpers() {
        assert_eq!(Hemisphere::South.flip(), -1.0);
        assert_eq!(Hemisphere::East.axis(), Axis::Longitude);
        assert_eq!(Hemisphere::from_symbol('w'), Some(Hemisphere::West));
        assert_eq!(Hemisphere::for_value(Axis::Latitude, -0.5), Hemisphere::South);
        assert_eq!(Hemisphere::for_value(Axis::Longitude, 0.0), Hemisphere::East);
    }

    proptest! {
        /// N50.1 E14.2, 50.1N 14.2E, E14.2 N50.1 and 14.2E 50.1N agree.
        #[test]
        fn prop_placement_symmetry(
            lat in 0.0f64..90.0,
            lon in 0.0f64..180.0,
            south in any::<bool>(),
            west in any::<bool>(),
        ) {
            let ns = if south { "S" } else { "N" };
            let ew = if west { "W" } else { "E" };
            let expected = resolve_pair(
                RawAxis::new(lat).with_prefix(ns, false),
                RawAxis::new(lon).with_prefix(ew, false),
            ).unwrap();

            let variants = [
                (RawAxis::new(lat).with_suffix(ns), RawAxis::new(lon).with_suffix(ew)),
                (RawAxis::new(lon).with_prefix(ew, false), RawAxis::new(lat).with_prefix(ns, false)),
                (RawAxis::new(lon).with_suffix(ew), RawAxis::new(lat).with_suffix(ns)),
            ];
            for (first, second) in variants {
                prop_assert_eq!(resolve_pair(first, second).unwrap(), expected);
            }
        }
    }
}
