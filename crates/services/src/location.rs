//! Scan results: resolved locations and raw matches.

use crate::error::Result;
use crate::service::ServiceId;
use betterlocation_geo::Coordinate;
use serde::Serialize;

/// Byte range of a match in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Span of a regex match.
    pub fn of(m: &regex::Match<'_>) -> Self {
        Self::new(m.start(), m.len())
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Whether the two ranges share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// One resolved location with its provenance.
///
/// Immutable once built; enrichments are attached with the consuming
/// `with_*` methods by whoever holds the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetterLocation {
    coordinate: Coordinate,
    source: ServiceId,
    source_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_type: Option<String>,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    descriptions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
}

impl BetterLocation {
    /// Creates a location recognized by `source` from `input`.
    pub fn new(
        coordinate: Coordinate,
        source: ServiceId,
        source_name: &'static str,
        input: impl Into<String>,
    ) -> Self {
        Self {
            coordinate,
            source,
            source_name,
            sub_type: None,
            input: input.into(),
            prefix: None,
            descriptions: Vec::new(),
            elevation: None,
            address: None,
            timezone: None,
        }
    }

    #[must_use]
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.descriptions.push(description.into());
        self
    }

    /// Elevation in metres above sea level.
    #[must_use]
    pub fn with_elevation(mut self, metres: f64) -> Self {
        self.elevation = Some(metres);
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// IANA timezone name, e.g. `Europe/Prague`.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Deduplication key of the coordinate.
    pub fn key(&self) -> String {
        self.coordinate.key()
    }

    pub fn source(&self) -> ServiceId {
        self.source
    }

    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    /// Finer label inside the service, e.g. `Portal` or `Map center`.
    pub fn sub_type(&self) -> Option<&str> {
        self.sub_type.as_deref()
    }

    /// Text the location was recognized from.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }
}

/// A span of text one service recognized, with its resolution outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatMatch {
    pub raw_text: String,
    pub span: Span,
    pub source: ServiceId,
    pub result: Result<BetterLocation>,
}

impl FormatMatch {
    pub fn new(
        raw_text: impl Into<String>,
        span: Span,
        source: ServiceId,
        result: Result<BetterLocation>,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            span,
            source,
            result,
        }
    }

    /// Whether the match produced a location.
    pub fn is_resolved(&self) -> bool {
        self.result.is_ok()
    }

    /// The location, when resolved.
    pub fn location(&self) -> Option<&BetterLocation> {
        self.result.as_ref().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prague() -> BetterLocation {
        BetterLocation::new(
            Coordinate::new(50.087451, 14.420671).unwrap(),
            ServiceId::WGS84_DEGREES,
            "WGS84",
            "50.087451,14.420671",
        )
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 10);
        assert!(a.overlaps(&Span::new(9, 3)));
        assert!(!a.overlaps(&Span::new(10, 3)));
        assert!(Span::new(2, 2).overlaps(&a));
        assert_eq!(a.end(), 10);
    }

    #[test]
    fn test_enrichment_builders() {
        let location = prague()
            .with_sub_type("Map center")
            .with_description("Old Town Square")
            .with_elevation(192.0)
            .with_timezone("Europe/Prague");

        assert_eq!(location.sub_type(), Some("Map center"));
        assert_eq!(location.descriptions(), ["Old Town Square".to_string()]);
        assert_eq!(location.elevation(), Some(192.0));
        assert_eq!(location.timezone(), Some("Europe/Prague"));
        assert_eq!(location.address(), None);
        assert_eq!(location.key(), "50.087451,14.420671");
    }

    #[test]
    fn test_serialization_skips_empty_enrichments() {
        let json = serde_json::to_value(prague()).unwrap();
        assert_eq!(json["source"], 1);
        assert_eq!(json["source_name"], "WGS84");
        assert_eq!(json["coordinate"]["latitude"], 50.087451);
        assert!(json.get("address").is_none());
        assert!(json.get("descriptions").is_none());
    }
}
