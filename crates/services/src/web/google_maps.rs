//! Google Maps links.

use super::{coordinate, lat_lon, parse_pair, scan_links, Link};
use crate::coordinates::Patterns;
use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;
use regex::Regex;

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(
        r#"(?i)\b(?:https?://)?(?:(?:www\.)?google\.[a-z]{2,3}(?:\.[a-z]{2})?/maps|maps\.google\.[a-z]{2,3}(?:\.[a-z]{2})?)(?:[/?#][^\s<>"]*)?"#,
    )
});

/// `!3d50.087451!4d14.420671` inside the data segment.
static PLACE_DATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!3d(-?[0-9]+(?:\.[0-9]+)?)!4d(-?[0-9]+(?:\.[0-9]+)?)").unwrap());

/// `/place/50.087451,14.420671`
static PLACE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/place/(-?[0-9]+(?:\.[0-9]+)?),\s*(-?[0-9]+(?:\.[0-9]+)?)").unwrap()
});

/// `@50.087451,14.420671,15z`
static MAP_CENTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?[0-9]+(?:\.[0-9]+)?),(-?[0-9]+(?:\.[0-9]+)?)").unwrap());

/// Query parameters that carry a searched or target position.
const POSITION_PARAMS: [&str; 5] = ["q", "query", "ll", "destination", "daddr"];

const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

fn captured_pair(pattern: &Regex, haystack: &str) -> Option<(f64, f64)> {
    let caps = pattern.captures(haystack)?;
    Some((caps.get(1)?.as_str().parse().ok()?, caps.get(2)?.as_str().parse().ok()?))
}

/// Google Maps recognizer (ID 10).
#[derive(Debug, Clone, Default)]
pub struct GoogleMaps {
    static_maps_key: Option<String>,
}

impl GoogleMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables static map images.
    #[must_use]
    pub fn with_static_maps_key(mut self, key: impl Into<String>) -> Self {
        self.static_maps_key = Some(key.into());
        self
    }

    /// Most specific position in the link: place data, position
    /// parameters, place path, then the map centre.
    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let link = Link::parse(raw)
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' is not a link")))?;
        let (pair, sub_type) = if let Some(pair) = captured_pair(&PLACE_DATA, &link.path) {
            (pair, Some("Place"))
        } else if let Some(pair) = POSITION_PARAMS
            .iter()
            .filter_map(|name| link.param(name))
            .find_map(|value| parse_pair(value.trim_start_matches("loc:")))
        {
            (pair, None)
        } else if let Some(pair) = captured_pair(&PLACE_PATH, &link.path) {
            (pair, Some("Place"))
        } else if let Some(pair) = captured_pair(&MAP_CENTER, &link.path) {
            (pair, Some("Map center"))
        } else {
            return Err(ServiceError::invalid(format!(
                "Google Maps link '{raw}' carries no coordinates"
            )));
        };

        let location = BetterLocation::new(coordinate(pair)?, self.id(), self.name(), raw);
        Ok(match sub_type {
            Some(label) => location.with_sub_type(label),
            None => location,
        })
    }
}

impl Service for GoogleMaps {
    fn id(&self) -> ServiceId {
        ServiceId::GOOGLE_MAPS
    }

    fn name(&self) -> &'static str {
        "Google Maps"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::ShareLink, Tag::DriveLink, Tag::StaticImage]
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
            return Err(ServiceError::invalid(format!("'{input}' is not a Google Maps link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareText))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!("https://www.google.com/maps/place/{lat},{lon}?q={lat},{lon}"))
    }

    fn drive_link(&self, coordinate: &Coordinate) -> Result<String> {
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!(
            "https://www.google.com/maps/dir/?api=1&destination={lat}%2C{lon}&travelmode=driving"
        ))
    }

    fn static_image_link(&self, coordinate: &Coordinate) -> Result<String> {
        let key = self.static_maps_key.as_deref().ok_or(ServiceError::NotConfigured {
            service: "Google Maps",
            what: "a static maps API key",
        })?;
        let (lat, lon) = lat_lon(coordinate);
        Ok(format!(
            "{STATIC_MAP_URL}?center={lat},{lon}&zoom=13&size=600x600&markers=color:red%7C{lat},{lon}&key={}",
            super::percent_encode(key)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn resolved(url: &str) -> BetterLocation {
        GoogleMaps::new().process(url).unwrap()
    }

    #[test]
    fn test_place_data_wins() {
        let location = resolved(
            "https://www.google.com/maps/place/Old+Town+Square/@50.0874,14.4206,17z/data=!3m1!4b1!4m5!3m4!1s0x0:0x0!8m2!3d50.087451!4d14.420671",
        );
        assert_eq!(location.key(), "50.087451,14.420671");
        assert_eq!(location.sub_type(), Some("Place"));
    }

    #[test]
    fn test_query_parameters() {
        assert_eq!(resolved("https://maps.google.com/?q=50.087451,14.420671").key(), "50.087451,14.420671");
        assert_eq!(
            resolved("https://www.google.com/maps/dir/?api=1&destination=-33.8688%2C151.2093").key(),
            "-33.868800,151.209300"
        );
        assert_eq!(resolved("https://maps.google.com/maps?q=loc:1.5,2.5").key(), "1.500000,2.500000");
    }

    #[test]
    fn test_textual_query_falls_through_to_map_center() {
        let location = resolved("https://www.google.com/maps/search/pizza/@50.0874,14.4206,15z?q=pizza");
        assert_eq!(location.key(), "50.087400,14.420600");
        assert_eq!(location.sub_type(), Some("Map center"));
    }

    #[test]
    fn test_place_path() {
        let location = resolved("https://www.google.cz/maps/place/50.087451,14.420671");
        assert_eq!(location.sub_type(), Some("Place"));
    }

    #[test]
    fn test_link_without_coordinates() {
        let found = GoogleMaps::new()
            .find_in_text("see https://www.google.com/maps/search/pizza please")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_text, "https://www.google.com/maps/search/pizza");
        assert_eq!(found[0].result.clone().unwrap_err().kind(), ErrorKind::InvalidInputFormat);
    }

    #[test]
    fn test_trailing_punctuation_is_not_part_of_the_link() {
        let text = "Here (https://maps.google.com/?q=50.1,14.2).";
        let found = GoogleMaps::new().find_in_text(text).unwrap();
        assert_eq!(found[0].raw_text, "https://maps.google.com/?q=50.1,14.2");
        assert_eq!(&text[found[0].span.offset..found[0].span.end()], found[0].raw_text);
    }

    #[test]
    fn test_links() {
        let prague = Coordinate::new(50.087451, 14.420671).unwrap();
        let service = GoogleMaps::new();
        assert_eq!(
            service.share_link(&prague).unwrap(),
            "https://www.google.com/maps/place/50.087451,14.420671?q=50.087451,14.420671"
        );
        assert!(service.drive_link(&prague).unwrap().contains("destination=50.087451%2C14.420671"));
        assert_eq!(
            service.static_image_link(&prague).unwrap_err().kind(),
            ErrorKind::ExternalDependencyFailure
        );
        let with_key = GoogleMaps::new().with_static_maps_key("abc");
        assert!(with_key.static_image_link(&prague).unwrap().ends_with("&key=abc"));
    }

    #[test]
    fn test_share_link_resolves_back() {
        let coordinate = Coordinate::new(-41.2865, 174.7762).unwrap();
        let service = GoogleMaps::new();
        let link = service.share_link(&coordinate).unwrap();
        assert_eq!(service.process(&link).unwrap().key(), coordinate.key());
    }
}
