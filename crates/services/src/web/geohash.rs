//! geohash.org links.

use super::scan_links;
use crate::coordinates::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::{geohash, Coordinate};
use once_cell::sync::Lazy;

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(
        r"(?i)\b(?:https?://)?(?:www\.)?geohash\.org/(?P<hash>[0-9b-hjkmnp-z]{1,22})\b(?:\?[^\s<>]*)?",
    )
});

/// Geohash recognizer (ID 8).
#[derive(Debug, Clone, Copy, Default)]
pub struct Geohash;

impl Geohash {
    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let hash = LINK
            .find
            .captures(raw)
            .and_then(|caps| caps.name("hash"))
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' carries no geohash")))?;
        let coordinate = geohash::decode(hash.as_str())?;
        Ok(BetterLocation::new(coordinate, self.id(), self.name(), raw))
    }
}

impl Service for Geohash {
    fn id(&self) -> ServiceId {
        ServiceId::GEOHASH
    }

    fn name(&self) -> &'static str {
        "Geohash"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::ShareLink, Tag::CopyableText]
    }

    fn validate(&self, input: &str) -> bool {
        LINK.anchored.is_match(input.trim())
    }

    fn find_in_text(&self, text: &str) -> Result<Vec<FormatMatch>> {
        Ok(scan_links(self, &LINK.find, text, |raw| self.resolve(raw)))
    }

    fn process(&self, input: &str) -> Result<BetterLocation> {
        let input = input.trim();
        if !self.validate(input) {
            return Err(ServiceError::invalid(format!("'{input}' is not a geohash.org link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(geohash::encode(coordinate, geohash::DEFAULT_LENGTH))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(format!("https://geohash.org/{}", self.share_text(coordinate)?))
    }

    fn drive_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::DriveLink))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
