//! UTM positions: `33U 458557 5548514`.

use super::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch, Span};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::{Coordinate, Utm};
use once_cell::sync::Lazy;
use regex::Captures;

/// Most digits a northing can have (10 000 000 m).
const MAX_NORTHING_DIGITS: u8 = 7;

/// Patterns indexed by minimum northing digits minus one.
static UTM: Lazy<Vec<Patterns>> = Lazy::new(|| {
    (1..=MAX_NORTHING_DIGITS)
        .map(|digits| Patterns::new(&utm_pattern(digits)))
        .collect()
});

fn utm_pattern(min_northing_digits: u8) -> String {
    format!(
        r"\b(?P<zone>[0-9]{{1,2}})\s?(?P<band>[C-HJ-NP-X])\s+(?P<easting>[0-9]{{1,6}}(?:\.[0-9]+)?)(?:\s?m?E)?\s+(?P<northing>[0-9]{{{min_northing_digits},7}}(?:\.[0-9]+)?)(?:\s?m?N)?\b"
    )
}

/// Converts captured parts. `None` when they do not form a position that
/// projects back into its declared band.
fn convert(caps: &Captures<'_>) -> Option<Coordinate> {
    let zone = caps.name("zone")?.as_str().parse().ok()?;
    let band = caps.name("band")?.as_str().chars().next()?;
    let easting = caps.name("easting")?.as_str().parse().ok()?;
    let northing = caps.name("northing")?.as_str().parse().ok()?;
    match Utm::new(zone, band, easting, northing).and_then(|utm| utm.to_coordinate()) {
        Ok(coordinate) => Some(coordinate),
        Err(e) => {
            tracing::trace!(error = %e, "UTM candidate rejected");
            None
        }
    }
}

/// UTM recognizer (ID 6).
///
/// Candidates that fail the projection are not reported at all, neither
/// as locations nor as errors.
#[derive(Debug, Clone, Copy)]
pub struct UtmService {
    min_northing_digits: u8,
}

impl UtmService {
    /// Scans prose for positions whose northing has at least
    /// `min_northing_digits` digits (clamped to 1-7).
    pub fn new(min_northing_digits: u8) -> Self {
        Self {
            min_northing_digits: min_northing_digits.clamp(1, MAX_NORTHING_DIGITS),
        }
    }

    fn patterns(min_northing_digits: u8) -> &'static Patterns {
        &UTM[usize::from(min_northing_digits - 1)]
    }

    fn location(&self, coordinate: Coordinate, raw: &str) -> BetterLocation {
        BetterLocation::new(coordinate, self.id(), self.name(), raw)
    }
}

impl Service for UtmService {
    fn id(&self) -> ServiceId {
        ServiceId::UTM
    }

    fn name(&self) -> &'static str {
        "UTM"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::CopyableText]
    }

    fn validate(&self, input: &str) -> bool {
        Self::patterns(1)
            .anchored
            .captures(input.trim())
            .and_then(|caps| convert(&caps))
            .is_some()
    }

    fn find_in_text(&self, text: &str) -> Result<Vec<FormatMatch>> {
        Ok(Self::patterns(self.min_northing_digits)
            .find
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let coordinate = convert(&caps)?;
                Some(FormatMatch::new(
                    whole.as_str(),
                    Span::of(&whole),
                    self.id(),
                    Ok(self.location(coordinate, whole.as_str())),
                ))
            })
            .collect())
    }

    fn process(&self, input: &str) -> Result<BetterLocation> {
        let input = input.trim();
        Self::patterns(1)
            .anchored
            .captures(input)
            .and_then(|caps| convert(&caps))
            .map(|coordinate| self.location(coordinate, input))
            .ok_or_else(|| ServiceError::invalid(format!("'{input}' is not a valid UTM position")))
    }

    fn share_text(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(Utm::from_coordinate(coordinate)?.to_string())
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
