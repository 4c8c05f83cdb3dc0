//! Ordered, deduplicated scan results.
//!
//! A scan pools matches into a [`CollectionBuilder`] in discovery order and
//! freezes it with [`CollectionBuilder::finish`]. The resulting
//! [`Collection`] is read-only.

use crate::error::{ErrorKind, ServiceError};
use crate::location::{BetterLocation, FormatMatch, Span};
use crate::service::ServiceId;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashSet;

/// Whether [`CollectionBuilder::finish`] collapses equal coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deduplication {
    /// Keep only the first entry per coordinate key
    #[default]
    Enabled,
    /// Keep every resolved entry
    Disabled,
}

impl From<bool> for Deduplication {
    fn from(enabled: bool) -> Self {
        if enabled {
            Deduplication::Enabled
        } else {
            Deduplication::Disabled
        }
    }
}

/// A match that was recognized but could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    source: ServiceId,
    source_name: &'static str,
    raw_text: String,
    span: Span,
    error: ServiceError,
}

impl ScanError {
    pub fn source(&self) -> ServiceId {
        self.source
    }

    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    /// Text the service recognized.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn error(&self) -> &ServiceError {
        &self.error
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl Serialize for ScanError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanError", 7)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("source_name", self.source_name)?;
        state.serialize_field("raw_text", &self.raw_text)?;
        state.serialize_field("span", &self.span)?;
        state.serialize_field("kind", &self.error.kind())?;
        state.serialize_field("code", &self.error.code())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

/// One collection entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status")]
pub enum Entry {
    #[serde(rename = "ok")]
    Location { span: Span, location: BetterLocation },
    #[serde(rename = "error")]
    Error(ScanError),
}

impl Entry {
    pub fn span(&self) -> Span {
        match self {
            Entry::Location { span, .. } => *span,
            Entry::Error(error) => error.span,
        }
    }

    pub fn location(&self) -> Option<&BetterLocation> {
        match self {
            Entry::Location { location, .. } => Some(location),
            Entry::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ScanError> {
        match self {
            Entry::Location { .. } => None,
            Entry::Error(error) => Some(error),
        }
    }
}

/// Mutable aggregation phase of a scan.
#[derive(Debug, Default)]
pub struct CollectionBuilder {
    entries: Vec<Entry>,
}

impl CollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one match produced by the service called `source_name`.
    pub fn push(&mut self, source_name: &'static str, found: FormatMatch) {
        let FormatMatch {
            raw_text,
            span,
            source,
            result,
        } = found;
        let entry = match result {
            Ok(location) => Entry::Location { span, location },
            Err(error) => Entry::Error(ScanError {
                source,
                source_name,
                raw_text,
                span,
                error,
            }),
        };
        self.entries.push(entry);
    }

    /// Appends every match, keeping their order.
    pub fn extend(&mut self, source_name: &'static str, found: impl IntoIterator<Item = FormatMatch>) {
        for m in found {
            self.push(source_name, m);
        }
    }

    /// Number of pooled entries, errors included.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the collection.
    ///
    /// With [`Deduplication::Enabled`] the first resolved entry per
    /// coordinate key wins. Error entries are always kept.
    pub fn finish(self, deduplication: Deduplication) -> Collection {
        let entries = match deduplication {
            Deduplication::Disabled => self.entries,
            Deduplication::Enabled => {
                let mut seen = HashSet::new();
                self.entries
                    .into_iter()
                    .filter(|entry| match entry.location() {
                        Some(location) => seen.insert(location.key()),
                        None => true,
                    })
                    .collect()
            }
        };
        Collection { entries }
    }
}

/// Final, immutable scan result.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Collection {
    entries: Vec<Entry>,
}

impl Collection {
    /// Number of resolved locations.
    pub fn len(&self) -> usize {
        self.locations().count()
    }

    /// True when nothing resolved, even if errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.locations().next().is_none()
    }

    /// All entries in discovery order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn locations(&self) -> impl Iterator<Item = &BetterLocation> {
        self.entries.iter().filter_map(Entry::location)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ScanError> {
        self.entries.iter().filter_map(Entry::error)
    }

    /// Coordinate keys of the resolved entries, in order.
    pub fn keys(&self) -> Vec<String> {
        self.locations().map(BetterLocation::key).collect()
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use betterlocation_geo::{Coordinate, GeoError};

    fn located(id: ServiceId, lat: f64, lon: f64, offset: usize) -> FormatMatch {
        let coordinate = Coordinate::new(lat, lon).unwrap();
        let raw = format!("{lat},{lon}");
        FormatMatch::new(
            raw.clone(),
            Span::new(offset, raw.len()),
            id,
            Ok(BetterLocation::new(coordinate, id, "test", raw)),
        )
    }

    fn failed(offset: usize) -> FormatMatch {
        FormatMatch::new(
            "50.1,200.5",
            Span::new(offset, 10),
            ServiceId::WGS84_DEGREES,
            Err(GeoError::LongitudeOutOfRange(200.5).into()),
        )
    }

    #[test]
    fn test_first_entry_wins() {
        let mut builder = CollectionBuilder::new();
        builder.push("DMS", located(ServiceId::WGS84_DEGREES_MINUTES_SECONDS, 50.0874511, 14.4206712, 0));
        builder.push("WGS84", located(ServiceId::WGS84_DEGREES, 50.087451, 14.420671, 40));

        let collection = builder.finish(Deduplication::Enabled);
        assert_eq!(collection.len(), 1);
        let first = collection.locations().next().unwrap();
        assert_eq!(first.source(), ServiceId::WGS84_DEGREES_MINUTES_SECONDS);
    }

    #[test]
    fn test_errors_skip_deduplication() {
        let mut builder = CollectionBuilder::new();
        builder.push("WGS84", failed(0));
        builder.push("WGS84", failed(20));
        builder.push("WGS84", located(ServiceId::WGS84_DEGREES, 1.0, 2.0, 40));

        let collection = builder.finish(Deduplication::Enabled);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.errors().count(), 2);
        assert_eq!(collection.entries().len(), 3);
    }

    #[test]
    fn test_disabled_keeps_duplicates() {
        let mut builder = CollectionBuilder::new();
        builder.extend(
            "WGS84",
            [
                located(ServiceId::WGS84_DEGREES, 1.0, 2.0, 0),
                located(ServiceId::WGS84_DEGREES, 1.0, 2.0, 10),
            ],
        );
        assert_eq!(builder.pending(), 2);
        assert_eq!(builder.finish(Deduplication::Disabled).len(), 2);
    }

    #[test]
    fn test_error_only_collection_is_empty() {
        let mut builder = CollectionBuilder::new();
        builder.push("WGS84", failed(0));
        let collection = builder.finish(Deduplication::Enabled);
        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);
        assert_eq!(collection.errors().next().unwrap().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_serialized_shape() {
        let mut builder = CollectionBuilder::new();
        builder.push("WGS84", located(ServiceId::WGS84_DEGREES, 1.0, 2.0, 0));
        builder.push("WGS84", failed(20));
        let json = serde_json::to_value(builder.finish(Deduplication::Enabled)).unwrap();

        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries[0]["status"], "ok");
        assert_eq!(entries[0]["location"]["source"], 1);
        assert_eq!(entries[1]["status"], "error");
        assert_eq!(entries[1]["kind"], "out_of_range");
        assert_eq!(entries[1]["code"], 10001);
        assert_eq!(entries[1]["span"]["offset"], 20);
    }
}
