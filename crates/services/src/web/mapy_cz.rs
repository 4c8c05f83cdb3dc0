//! Mapy.cz links.

use super::{coordinate, lat_lon, parse_pair, scan_links, Link};
use crate::coordinates::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(r#"(?i)\b(?:https?://)?(?:[a-z]+\.)?mapy\.(?:cz|com)(?:[/?#][^\s<>"]*)?"#)
});

/// Mapy.cz recognizer (ID 12).
#[derive(Debug, Clone, Copy, Default)]
pub struct MapyCz;

impl MapyCz {
    /// A pinned point (`source=coor&id=lon,lat`) wins over the map centre
    /// (`x=lon&y=lat`).
    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let link = Link::parse(raw)
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' is not a link")))?;

        let pinned = (link.param("source") == Some("coor"))
            .then(|| link.param("id").and_then(parse_pair))
            .flatten()
            .map(|(lon, lat)| (lat, lon));
        if let Some(pair) = pinned {
            return Ok(BetterLocation::new(coordinate(pair)?, self.id(), self.name(), raw));
        }

        let center = || -> Option<(f64, f64)> {
            Some((link.param("y")?.trim().parse().ok()?, link.param("x")?.trim().parse().ok()?))
        };
        match center() {
            Some(pair) => Ok(BetterLocation::new(coordinate(pair)?, self.id(), self.name(), raw)
                .with_sub_type("Map center")),
            None => Err(ServiceError::invalid(format!(
                "Mapy.cz link '{raw}' carries no coordinates"
            ))),
        }
    }
}

impl Service for MapyCz {
    fn id(&self) -> ServiceId {
        ServiceId::MAPY_CZ
    }

    fn name(&self) -> &'static str {
        "Mapy.cz"
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
            return Err(ServiceError::invalid(format!("'{input}' is not a Mapy.cz link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareText))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!(
            "https://mapy.cz/zakladni?y={lat}&x={lon}&source=coor&id={lon}%2C{lat}"
        ))
    }

    fn drive_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!(
            "https://mapy.cz/fnc/v1/route?end={lon},{lat}&routeType=car_fast"
        ))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        // needs the screenshot endpoint and its signing
        Err(ServiceError::NotImplemented {
            service: self.name(),
            operation: Operation::StaticImage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_pinned_point_wins() {
        let location = MapyCz
            .process("https://mapy.cz/zakladni?x=14.4&y=50.0&z=15&source=coor&id=14.420671%2C50.087451")
            .unwrap();
        assert_eq!(location.key(), "50.087451,14.420671");
        assert_eq!(location.sub_type(), None);
    }

    #[test]
    fn test_map_center() {
        let location = MapyCz
            .process("https://en.mapy.cz/turisticka?x=14.4206710&y=50.0874510&z=17")
            .unwrap();
        assert_eq!(location.key(), "50.087451,14.420671");
        assert_eq!(location.sub_type(), Some("Map center"));
    }

    #[test]
    fn test_place_link_without_coordinates() {
        let found = MapyCz
            .find_in_text("Try https://mapy.cz/s/gesokofuha!")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_text, "https://mapy.cz/s/gesokofuha");
        assert_eq!(found[0].result.clone().unwrap_err().kind(), ErrorKind::InvalidInputFormat);
    }

    #[test]
    fn test_links() {
        let coordinate = Coordinate::new(49.195061, 16.606836).unwrap();
        let link = MapyCz.share_link(&coordinate).unwrap();
        assert_eq!(
            link,
            "https://mapy.cz/zakladni?y=49.195061&x=16.606836&source=coor&id=16.606836%2C49.195061"
        );
        assert_eq!(MapyCz.process(&link).unwrap().key(), coordinate.key());
        assert!(MapyCz.drive_link(&coordinate).unwrap().contains("end=16.606836,49.195061"));
        assert_eq!(
            MapyCz.static_image_link(&coordinate).unwrap_err().kind(),
            ErrorKind::NotImplemented
        );
    }
}
