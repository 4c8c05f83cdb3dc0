//! Recognizers for map-service links and identifiers.
//!
//! URLs are picked out of prose with a loose per-service pattern, then
//! split into host, path, query and fragment and read by the service.

mod bannergress;
mod geohash;
mod google_maps;
mod ingress;
mod mapy_cz;
mod openstreetmap;
mod waze;
mod what3words;

pub use bannergress::Bannergress;
pub use geohash::Geohash;
pub use google_maps::GoogleMaps;
pub use ingress::IngressIntel;
pub use mapy_cz::MapyCz;
pub use openstreetmap::OpenStreetMap;
pub use waze::Waze;
pub use what3words::What3Words;

use crate::error::Result;
use crate::location::{BetterLocation, FormatMatch, Span};
use crate::service::Service;
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[a-z][a-z0-9+.-]*://)?(?P<host>[^/?#\s]+)(?P<path>/[^?#]*)?(?:\?(?P<query>[^#]*))?(?:#(?P<fragment>.*))?$",
    )
    .unwrap()
});

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\''];

/// A URL split into its parts, with path, query and fragment decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub host: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub fragment: String,
}

impl Link {
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = URL_PARTS.captures(raw.trim())?;
        let part = |name: &str| caps.name(name).map_or("", |m| m.as_str());
        let query = part("query")
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_query(key), decode_query(value))
            })
            .collect();
        Some(Self {
            host: part("host").to_ascii_lowercase(),
            path: percent_decode(part("path")),
            query,
            fragment: percent_decode(part("fragment")),
        })
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn decode_query(component: &str) -> String {
    percent_decode(&component.replace('+', " "))
}

/// Decodes `%XX` escapes; malformed escapes are kept literally.
pub(crate) fn percent_decode(input: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned()
}

/// Escapes everything but RFC 3986 unreserved characters.
pub(crate) fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Reads `lat,lon` with optional whitespace around the comma.
pub(crate) fn parse_pair(value: &str) -> Option<(f64, f64)> {
    let (first, second) = value.split_once(',')?;
    Some((first.trim().parse().ok()?, second.trim().parse().ok()?))
}

/// Coordinate from numbers read out of a link.
pub(crate) fn coordinate((lat, lon): (f64, f64)) -> Result<Coordinate> {
    Ok(Coordinate::new(lat, lon)?)
}

/// Six-decimal latitude and longitude for building links.
pub(crate) fn lat_lon(coordinate: &Coordinate) -> (String, String) {
    (
        format!("{:.6}", coordinate.latitude()),
        format!("{:.6}", coordinate.longitude()),
    )
}

/// Runs `pattern` over `text` and resolves every URL it finds.
pub(crate) fn scan_links<S, F>(service: &S, pattern: &Regex, text: &str, resolve: F) -> Vec<FormatMatch>
where
    S: Service + ?Sized,
    F: Fn(&str) -> Result<BetterLocation>,
{
    pattern
        .find_iter(text)
        .map(|m| {
            let raw = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            FormatMatch::new(raw, Span::new(m.start(), raw.len()), service.id(), resolve(raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_parts() {
        let link = Link::parse("https://WWW.Example.com/a%20b/c?x=1&y=two+words&flag#map=17/50.1/14.2").unwrap();
        assert_eq!(link.host, "www.example.com");
        assert_eq!(link.path, "/a b/c");
        assert_eq!(link.param("x"), Some("1"));
        assert_eq!(link.param("y"), Some("two words"));
        assert_eq!(link.param("flag"), Some(""));
        assert_eq!(link.param("z"), None);
        assert_eq!(link.fragment, "map=17/50.1/14.2");
    }

    #[test]
    fn test_link_without_scheme() {
        let link = Link::parse("waze.com/ul?ll=50.1,14.2").unwrap();
        assert_eq!(link.host, "waze.com");
        assert_eq!(link.path, "/ul");
        assert_eq!(link.param("ll"), Some("50.1,14.2"));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("50.1%2C14.2"), "50.1,14.2");
        assert_eq!(percent_decode("%C5%99"), "ř");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("index.home.raft"), "index.home.raft");
        assert_eq!(percent_encode("a b,ř"), "a%20b%2C%C5%99");
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("50.1, 14.2"), Some((50.1, 14.2)));
        assert_eq!(parse_pair("-33.8,151.2"), Some((-33.8, 151.2)));
        assert_eq!(parse_pair("Prague"), None);
        assert_eq!(parse_pair("50.1,east"), None);
    }
}
