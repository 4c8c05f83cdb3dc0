//! Ingress Intel map links.

use super::{coordinate, lat_lon, parse_pair, scan_links, Link};
use crate::coordinates::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(r#"(?i)\b(?:https?://)?intel\.ingress\.com(?:[/?#][^\s<>"]*)?"#)
});

/// Ingress Intel recognizer (ID 14).
#[derive(Debug, Clone, Copy, Default)]
pub struct IngressIntel;

impl IngressIntel {
    /// Selected portal (`pll`) first, then the map centre (`ll`).
    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let link = Link::parse(raw)
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' is not a link")))?;
        let (pair, sub_type) = if let Some(pair) = link.param("pll").and_then(parse_pair) {
            (pair, "Portal")
        } else if let Some(pair) = link.param("ll").and_then(parse_pair) {
            (pair, "Map center")
        } else {
            return Err(ServiceError::invalid(format!(
                "Ingress Intel link '{raw}' carries no coordinates"
            )));
        };
        Ok(BetterLocation::new(coordinate(pair)?, self.id(), self.name(), raw).with_sub_type(sub_type))
    }
}

impl Service for IngressIntel {
    fn id(&self) -> ServiceId {
        ServiceId::INGRESS_INTEL
    }

    fn name(&self) -> &'static str {
        "Ingress Intel"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::ShareLink]
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
            return Err(ServiceError::invalid(format!("'{input}' is not an Ingress Intel link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareText))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!("https://intel.ingress.com/intel?ll={lat},{lon}&pll={lat},{lon}"))
    }

    fn drive_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::DriveLink))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
