//! Waze links.

use super::{coordinate, lat_lon, parse_pair, scan_links, Link};
use crate::coordinates::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(
        r#"(?i)\b(?:https?://)?(?:(?:www\.)?waze\.com/(?:[a-z]{2}(?:-[a-z]{2})?/)?(?:ul|live-map)|ul\.waze\.com/ul)(?:[/?#][^\s<>"]*)?"#,
    )
});

/// Waze recognizer (ID 11).
#[derive(Debug, Clone, Copy, Default)]
pub struct Waze;

impl Waze {
    /// `ll=lat,lon`, `to=ll.lat,lon` or separate `lat` and `lon`.
    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let link = Link::parse(raw)
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' is not a link")))?;

        let pair = link
            .param("ll")
            .and_then(parse_pair)
            .or_else(|| link.param("to").and_then(|to| parse_pair(to.strip_prefix("ll.")?)))
            .or_else(|| {
                Some((
                    link.param("lat")?.trim().parse().ok()?,
                    link.param("lon")?.trim().parse().ok()?,
                ))
            })
            .ok_or_else(|| ServiceError::invalid(format!("Waze link '{raw}' carries no coordinates")))?;

        Ok(BetterLocation::new(coordinate(pair)?, self.id(), self.name(), raw))
    }
}

impl Service for Waze {
    fn id(&self) -> ServiceId {
        ServiceId::WAZE
    }

    fn name(&self) -> &'static str {
        "Waze"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::ShareLink, Tag::DriveLink]
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
            return Err(ServiceError::invalid(format!("'{input}' is not a Waze link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareText))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!("https://www.waze.com/ul?ll={lat},{lon}"))
    }

    fn drive_link(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(format!("{}&navigate=yes", self.share_link(coordinate)?))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
