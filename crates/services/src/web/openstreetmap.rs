//! OpenStreetMap links.

use super::{coordinate, lat_lon, scan_links, Link};
use crate::coordinates::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(
        r#"(?i)\b(?:https?://)?(?:www\.)?(?:openstreetmap\.org|osm\.org)(?:[/?#][^\s<>"]*)?"#,
    )
});

/// `map=zoom/lat/lon` in the fragment.
fn fragment_center(fragment: &str) -> Option<(f64, f64)> {
    let view = fragment
        .split('&')
        .find_map(|part| part.strip_prefix("map="))?;
    let mut parts = view.split('/').skip(1);
    Some((parts.next()?.parse().ok()?, parts.next()?.parse().ok()?))
}

/// OpenStreetMap recognizer (ID 13).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenStreetMap;

impl OpenStreetMap {
    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let link = Link::parse(raw)
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' is not a link")))?;

        let marker = || -> Option<(f64, f64)> {
            Some((
                link.param("mlat")?.trim().parse().ok()?,
                link.param("mlon")?.trim().parse().ok()?,
            ))
        };
        let (pair, sub_type) = if let Some(pair) = marker() {
            (pair, "Marker")
        } else if let Some(pair) = fragment_center(&link.fragment) {
            (pair, "Map center")
        } else {
            return Err(ServiceError::invalid(format!(
                "OpenStreetMap link '{raw}' carries no coordinates"
            )));
        };

        Ok(BetterLocation::new(coordinate(pair)?, self.id(), self.name(), raw).with_sub_type(sub_type))
    }
}

impl Service for OpenStreetMap {
    fn id(&self) -> ServiceId {
        ServiceId::OPENSTREETMAP
    }

    fn name(&self) -> &'static str {
        "OpenStreetMap"
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
            return Err(ServiceError::invalid(format!("'{input}' is not an OpenStreetMap link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareText))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=17/{lat}/{lon}"
        ))
    }

    fn drive_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!(
            "https://www.openstreetmap.org/directions?route=%3B{lat}%2C{lon}"
        ))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
