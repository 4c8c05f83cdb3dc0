//! MGRS and USNG grid references.

use super::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch, Span};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::mgrs::MAX_PRECISION;
use betterlocation_geo::{Coordinate, Mgrs};
use once_cell::sync::Lazy;
use regex::Captures;

/// Patterns indexed by minimum digits per axis minus one.
static MGRS: Lazy<Vec<Patterns>> = Lazy::new(|| {
    (1..=MAX_PRECISION)
        .map(|digits| Patterns::new(&grid_pattern(GridSystem::Mgrs, digits)))
        .collect()
});

static USNG: Lazy<Vec<Patterns>> = Lazy::new(|| {
    (1..=MAX_PRECISION)
        .map(|digits| Patterns::new(&grid_pattern(GridSystem::Usng, digits)))
        .collect()
});

/// Which spelling of the grid is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSystem {
    /// Compact or spaced: `33UVR5855748514`, `33U VR 58557 48514`
    Mgrs,
    /// Spaced only: `33U VR 58557 48514`
    Usng,
}

/// Shared grid grammar; each axis needs at least `min_digits` digits.
fn grid_pattern(system: GridSystem, min_digits: u8) -> String {
    let head = r"\b(?P<zone>[0-9]{1,2})\s?(?P<band>[C-HJ-NP-X])";
    let square = "(?P<square>[A-HJ-NP-Z]{2})";
    let spaced = format!(r"[0-9]{{{min_digits},5}}\s[0-9]{{{min_digits},5}}");
    match system {
        GridSystem::Mgrs => format!(
            r"{head}\s?{square}\s?(?P<offsets>{spaced}|[0-9]{{{compact},10}})\b",
            compact = u16::from(min_digits) * 2
        ),
        GridSystem::Usng => format!(r"{head}\s{square}\s(?P<offsets>{spaced})\b"),
    }
}

/// Reassembles the captured parts into the compact form.
fn parse_reference(caps: &Captures<'_>) -> Result<Mgrs> {
    let part = |name: &str| caps.name(name).map_or("", |m| m.as_str());
    let offsets = part("offsets");
    let mut groups = offsets.split_whitespace();
    let digits = match (groups.next(), groups.next()) {
        (Some(easting), Some(northing)) if easting.len() != northing.len() => {
            return Err(ServiceError::invalid(format!(
                "Easting and northing of '{offsets}' differ in precision"
            )));
        }
        (Some(easting), Some(northing)) => format!("{easting}{northing}"),
        _ => offsets.to_string(),
    };
    Ok(format!("{}{}{}{digits}", part("zone"), part("band"), part("square")).parse()?)
}

/// MGRS (ID 4) or USNG (ID 5) recognizer.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    system: GridSystem,
    min_digits: u8,
}

impl Grid {
    /// MGRS scanning prose for references with at least `min_digits`
    /// digits per axis (clamped to 1-5).
    pub fn mgrs(min_digits: u8) -> Self {
        Self {
            system: GridSystem::Mgrs,
            min_digits: min_digits.clamp(1, MAX_PRECISION),
        }
    }

    /// USNG, see [`Grid::mgrs`].
    pub fn usng(min_digits: u8) -> Self {
        Self {
            system: GridSystem::Usng,
            min_digits: min_digits.clamp(1, MAX_PRECISION),
        }
    }

    fn patterns(&self, min_digits: u8) -> &'static Patterns {
        let table = match self.system {
            GridSystem::Mgrs => &MGRS,
            GridSystem::Usng => &USNG,
        };
        &table[usize::from(min_digits - 1)]
    }

    fn locate(&self, caps: &Captures<'_>, raw: &str) -> Result<BetterLocation> {
        let coordinate = parse_reference(caps)?.to_coordinate()?;
        Ok(BetterLocation::new(coordinate, self.id(), self.name(), raw))
    }
}

impl Service for Grid {
    fn id(&self) -> ServiceId {
        match self.system {
            GridSystem::Mgrs => ServiceId::MGRS,
            GridSystem::Usng => ServiceId::USNG,
        }
    }

    fn name(&self) -> &'static str {
        match self.system {
            GridSystem::Mgrs => "MGRS",
            GridSystem::Usng => "USNG",
        }
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::CopyableText]
    }

    /// Full precision range: a single digit per axis is accepted.
    fn validate(&self, input: &str) -> bool {
        self.patterns(1).anchored.is_match(input.trim())
    }

    fn find_in_text(&self, text: &str) -> Result<Vec<FormatMatch>> {
        Ok(self
            .patterns(self.min_digits)
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
            .patterns(1)
            .anchored
            .captures(input)
            .ok_or_else(|| ServiceError::invalid(format!("'{input}' is not a {} reference", self.name())))?;
        self.locate(&caps, input)
    }

    fn share_text(&self, coordinate: &Coordinate) -> Result<String> {
        let reference = Mgrs::from_coordinate(coordinate, MAX_PRECISION)?;
        Ok(match self.system {
            GridSystem::Mgrs => reference.to_string(),
            GridSystem::Usng => reference.to_spaced_string(),
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn prague() -> Coordinate {
        Coordinate::new(50.087451, 14.420671).unwrap()
    }

    #[test]
    fn test_find_compact_and_spaced() {
        let compact = Grid::mgrs(3).share_text(&prague()).unwrap();
        let spaced = Grid::usng(3).share_text(&prague()).unwrap();
        assert!(compact.starts_with("33UVR"));
        assert!(spaced.starts_with("33U VR "));

        let text = format!("Checkpoint {compact}, fallback {spaced}.");
        let found = Grid::mgrs(3).find_in_text(&text).unwrap();
        assert_eq!(found.len(), 2);
        for m in &found {
            let c = m.location().unwrap().coordinate();
            assert!((c.latitude() - 50.087451).abs() < 2e-5);
            assert!((c.longitude() - 14.420671).abs() < 2e-5);
        }
        assert_eq!(found[0].raw_text, compact);
    }

    #[test]
    fn test_usng_requires_spaces() {
        let compact = Grid::mgrs(3).share_text(&prague()).unwrap();
        assert!(Grid::usng(3).find_in_text(&compact).unwrap().is_empty());
        assert!(!Grid::usng(3).validate(&compact));
        assert!(Grid::mgrs(3).validate(&compact));
    }

    #[test]
    fn test_min_digits_only_limits_free_text() {
        let service = Grid::mgrs(3);
        assert!(service.find_in_text("grid 33UVR5848 now").unwrap().is_empty());
        assert_eq!(Grid::mgrs(1).find_in_text("grid 33UVR5848 now").unwrap().len(), 1);
        assert!(service.validate("33UVR5848"));
        assert!(service.validate("33U VR 5 4"));
    }

    #[test]
    fn test_invalid_square_is_an_error_entry() {
        // column 'A' is not used in zone 33
        let found = Grid::mgrs(3).find_in_text("33UAR123456").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].result.clone().unwrap_err().kind(), ErrorKind::InvalidInputFormat);
    }

    #[test]
    fn test_unequal_spaced_groups() {
        let err = Grid::mgrs(1).process("33U VR 585 4851").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn test_odd_compact_digits() {
        assert!(Grid::mgrs(1).process("33UVR5855748").is_err());
    }

    #[test]
    fn test_polar_share_text_fails() {
        let pole = Coordinate::new(89.0, 0.0).unwrap();
        assert!(Grid::mgrs(3).share_text(&pole).is_err());
    }

    proptest! {
        #[test]
        fn prop_share_text_round_trip(lat in -55.0f64..55.0, lon in -179.9f64..179.9) {
            let coordinate = Coordinate::new(lat, lon).unwrap();
            for service in [Grid::mgrs(3), Grid::usng(3)] {
                let text = service.share_text(&coordinate).unwrap();
                let parsed = service.process(&text).unwrap();
                prop_assert!((parsed.coordinate().latitude() - lat).abs() <= 1e-5, "{}", text);
                prop_assert!((parsed.coordinate().longitude() - lon).abs() <= 1e-5, "{}", text);
            }
        }
    }
}
