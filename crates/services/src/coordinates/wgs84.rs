//! Latitude/longitude pairs in decimal degrees, degrees and decimal
//! minutes, or degrees, minutes and seconds.
//!
//! All three notations share one pair grammar: an optional hemisphere
//! symbol before and after each number and a comma, semicolon or
//! whitespace between them. Only the magnitude differs.

use super::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch, Span};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::dms::{checked_degrees, format_dm, format_dms};
use betterlocation_geo::{resolve_pair, Axis, Coordinate, RawAxis};
use once_cell::sync::Lazy;
use regex::Captures;

static DEGREES: Lazy<Patterns> = Lazy::new(|| Patterns::new(&pair_pattern(Notation::Degrees)));
static DEGREES_MINUTES: Lazy<Patterns> =
    Lazy::new(|| Patterns::new(&pair_pattern(Notation::DegreesMinutes)));
static DEGREES_MINUTES_SECONDS: Lazy<Patterns> =
    Lazy::new(|| Patterns::new(&pair_pattern(Notation::DegreesMinutesSeconds)));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    Degrees,
    DegreesMinutes,
    DegreesMinutesSeconds,
}

impl Notation {
    /// Magnitude of one axis; group names are prefixed with `axis`.
    fn magnitude_pattern(self, axis: &str) -> String {
        match self {
            // 20 fractional digits covers high-precision dumps
            Notation::Degrees => format!(r"(?P<{axis}_deg>[0-9]{{1,3}}\.[0-9]{{1,20}})(?:\s?[°º])?"),
            Notation::DegreesMinutes => format!(
                r"(?P<{axis}_deg>[0-9]{{1,3}})(?:\s?[°º]\s?|\s)(?P<{axis}_min>[0-9]{{1,2}}(?:\.[0-9]{{1,20}})?)\s?['′]"
            ),
            Notation::DegreesMinutesSeconds => format!(
                r#"(?P<{axis}_deg>[0-9]{{1,3}})(?:\s?[°º]\s?|\s)(?P<{axis}_min>[0-9]{{1,2}})\s?['′]\s?(?P<{axis}_sec>[0-9]{{1,2}}(?:\.[0-9]{{1,20}})?)\s?(?:"|″|'')"#
            ),
        }
    }

    fn magnitude(self, caps: &Captures<'_>, axis: &str) -> Result<f64> {
        let number = |unit: &str| -> Result<f64> {
            match caps.name(&format!("{axis}_{unit}")) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| ServiceError::invalid(format!("'{}' is not a number", m.as_str()))),
                None => Ok(0.0),
            }
        };
        match self {
            Notation::Degrees => number("deg"),
            Notation::DegreesMinutes => Ok(checked_degrees(number("deg")?, number("min")?, 0.0)?),
            Notation::DegreesMinutesSeconds => {
                Ok(checked_degrees(number("deg")?, number("min")?, number("sec")?)?)
            }
        }
    }
}

/// Full pair grammar for one notation.
///
/// The latitude suffix is lazy so `50.1 N 14.2 E` is first tried with `N`
/// as a longitude prefix; [`reattribute`] moves it back when needed.
fn pair_pattern(notation: Notation) -> String {
    format!(
        r"(?:(?P<lat_pre>\b[NSEW]|[-+])(?P<lat_gap>\s?)|\b){lat}(?:\s?(?P<lat_suf>[NSEW])\b)??(?P<sep>\s*[,;]\s*|\s+)(?:(?P<lon_pre>\b[NSEW]|[-+])(?P<lon_gap>\s?)|\b){lon}(?:\s?(?P<lon_suf>[NSEW])\b)?",
        lat = notation.magnitude_pattern("lat"),
        lon = notation.magnitude_pattern("lon"),
    )
}

/// Hemisphere symbols of one matched pair after reattribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Symbols<'t> {
    lat_prefix: &'t str,
    lat_spaced: bool,
    lat_suffix: &'t str,
    lon_prefix: &'t str,
    lon_suffix: &'t str,
}

/// A letter between two bare numbers separated only by whitespace belongs
/// to the first number when the second already has a suffix or is spaced
/// away from the letter.
fn reattribute<'t>(caps: &Captures<'t>) -> Symbols<'t> {
    let text = |name: &str| caps.name(name).map_or("", |m| m.as_str());
    let mut symbols = Symbols {
        lat_prefix: text("lat_pre"),
        lat_spaced: !text("lat_gap").is_empty(),
        lat_suffix: text("lat_suf"),
        lon_prefix: text("lon_pre"),
        lon_suffix: text("lon_suf"),
    };

    let lat_bare = symbols.lat_prefix.is_empty() && symbols.lat_suffix.is_empty();
    let lon_letter = symbols.lon_prefix.chars().all(char::is_alphabetic) && !symbols.lon_prefix.is_empty();
    let whitespace_only = !text("sep").contains([',', ';']);
    let lon_detached = !symbols.lon_suffix.is_empty() || !text("lon_gap").is_empty();

    if lat_bare && lon_letter && whitespace_only && lon_detached {
        symbols.lat_suffix = symbols.lon_prefix;
        symbols.lon_prefix = "";
    }
    symbols
}

/// One of the three WGS84 notations.
#[derive(Debug, Clone, Copy)]
pub struct Wgs84 {
    notation: Notation,
}

impl Wgs84 {
    /// `50.087451, 14.420671`
    pub fn degrees() -> Self {
        Self {
            notation: Notation::Degrees,
        }
    }

    /// `N 50°5.24706' E 14°25.24027'`
    pub fn degrees_minutes() -> Self {
        Self {
            notation: Notation::DegreesMinutes,
        }
    }

    /// `N 50°5'14.824" E 14°25'14.416"`
    pub fn degrees_minutes_seconds() -> Self {
        Self {
            notation: Notation::DegreesMinutesSeconds,
        }
    }

    fn patterns(&self) -> &'static Patterns {
        match self.notation {
            Notation::Degrees => &DEGREES,
            Notation::DegreesMinutes => &DEGREES_MINUTES,
            Notation::DegreesMinutesSeconds => &DEGREES_MINUTES_SECONDS,
        }
    }

    fn resolve(&self, caps: &Captures<'_>) -> Result<Coordinate> {
        let symbols = reattribute(caps);
        let lat = self.notation.magnitude(caps, "lat")?;
        let lon = self.notation.magnitude(caps, "lon")?;

        let first = RawAxis::new(lat)
            .with_prefix(symbols.lat_prefix, symbols.lat_spaced)
            .with_suffix(symbols.lat_suffix);
        let second = RawAxis::new(lon)
            .with_prefix(symbols.lon_prefix, false)
            .with_suffix(symbols.lon_suffix);
        Ok(resolve_pair(first, second)?)
    }

    fn locate(&self, caps: &Captures<'_>, raw: &str) -> Result<BetterLocation> {
        let coordinate = self.resolve(caps)?;
        Ok(BetterLocation::new(coordinate, self.id(), self.name(), raw))
    }
}

impl Service for Wgs84 {
    fn id(&self) -> ServiceId {
        match self.notation {
            Notation::Degrees => ServiceId::WGS84_DEGREES,
            Notation::DegreesMinutes => ServiceId::WGS84_DEGREES_MINUTES,
            Notation::DegreesMinutesSeconds => ServiceId::WGS84_DEGREES_MINUTES_SECONDS,
        }
    }

    fn name(&self) -> &'static str {
        match self.notation {
            Notation::Degrees => "WGS84",
            Notation::DegreesMinutes => "WGS84 DM",
            Notation::DegreesMinutesSeconds => "WGS84 DMS",
        }
    }

    fn tags(&self) -> &'static [Tag] {
        match self.notation {
            Notation::Degrees => &[Tag::FreeText],
            Notation::DegreesMinutes | Notation::DegreesMinutesSeconds => {
                &[Tag::FreeText, Tag::CopyableText]
            }
        }
    }

    fn validate(&self, input: &str) -> bool {
        self.patterns().anchored.is_match(input.trim())
    }

    fn find_in_text(&self, text: &str) -> Result<Vec<FormatMatch>> {
        Ok(self
            .patterns()
            .find
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let result = self.locate(&caps, whole.as_str());
                Some(FormatMatch::new(whole.as_str(), Span::of(&whole), self.id(), result))
            })
            .collect())
    }

    fn process(&self, input: &str) -> Result<BetterLocation> {
        let input = input.trim();
        let caps = self
            .patterns()
            .anchored
            .captures(input)
            .ok_or_else(|| ServiceError::invalid(format!("'{input}' is not {} notation", self.name())))?;
        self.locate(&caps, input)
    }

    fn share_text(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = (coordinate.latitude(), coordinate.longitude());
        match self.notation {
            Notation::Degrees => Err(ServiceError::not_supported(self.name(), Operation::ShareText)),
            Notation::DegreesMinutes => Ok(format!(
                "{} {}",
                format_dm(lat, Axis::Latitude),
                format_dm(lon, Axis::Longitude)
            )),
            Notation::DegreesMinutesSeconds => Ok(format!(
                "{} {}",
                format_dms(lat, Axis::Latitude),
                format_dms(lon, Axis::Longitude)
            )),
        }
    }

    fn share_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareLink))
    }

    fn drive_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::DriveLink))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
