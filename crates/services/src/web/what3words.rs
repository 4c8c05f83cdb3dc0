//! What3Words addresses: `///index.home.raft`, `w3w.co/index.home.raft`.
//!
//! Addresses are resolved through the What3Words API via the injected
//! fetcher, and need an API key.

use super::{percent_encode, scan_links};
use crate::coordinates::Patterns;
use crate::error::{FetchError, Operation, Result, ServiceError};
use crate::fetch::JsonFetcher;
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::Coordinate;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

static ADDRESS: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(
        r"(?:(?:https?://)?(?:www\.)?(?:w3w\.co|what3words\.com)/|///)(?P<words>\p{L}{1,30}\.\p{L}{1,30}\.\p{L}{1,30})",
    )
});

/// What3Words recognizer (ID 9).
pub struct What3Words {
    fetcher: Arc<dyn JsonFetcher>,
    base_url: String,
    api_key: Option<String>,
}

impl What3Words {
    /// `base_url` is the API root, e.g. `https://api.what3words.com/v3`.
    pub fn new(fetcher: Arc<dyn JsonFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(ServiceError::NotConfigured {
            service: "What3Words",
            what: "an API key",
        })
    }

    /// Fetches `url`; the API key never reaches the returned error.
    fn fetch(&self, url: &str, key: &str) -> Result<Value> {
        self.fetcher.get(url).map_err(|source| {
            let source = source.redact(key);
            tracing::warn!(error = %source, "What3Words lookup failed");
            ServiceError::External {
                service: self.name(),
                source,
            }
        })
    }

    fn bad_response(&self, url: &str, key: &str, message: &str) -> ServiceError {
        tracing::warn!(detail = message, "Unexpected What3Words response");
        ServiceError::External {
            service: self.name(),
            source: FetchError::BadResponse {
                url: url.to_string(),
                message: message.to_string(),
            }
            .redact(key),
        }
    }

    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let words = ADDRESS
            .find
            .captures(raw)
            .and_then(|caps| caps.name("words"))
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' is not a What3Words address")))?
            .as_str()
            .to_lowercase();
        let key = self.api_key()?;

        let url = format!(
            "{}/convert-to-coordinates?words={}&key={}",
            self.base_url,
            percent_encode(&words),
            percent_encode(key)
        );
        let body = self.fetch(&url, key)?;
        let point = body.get("coordinates");
        let (Some(lat), Some(lon)) = (
            point.and_then(|c| c.get("lat")).and_then(Value::as_f64),
            point.and_then(|c| c.get("lng")).and_then(Value::as_f64),
        ) else {
            return Err(self.bad_response(&url, key, "missing coordinates.lat/lng"));
        };

        let mut location = BetterLocation::new(Coordinate::new(lat, lon)?, self.id(), self.name(), raw)
            .with_prefix(format!("///{words}"));
        if let Some(place) = body.get("nearestPlace").and_then(Value::as_str) {
            location = location.with_description(place);
        }
        Ok(location)
    }

    /// The three-word address of a coordinate.
    fn words(&self, coordinate: &Coordinate) -> Result<String> {
        let key = self.api_key()?;
        let url = format!(
            "{}/convert-to-3wa?coordinates={:.6}%2C{:.6}&key={}",
            self.base_url,
            coordinate.latitude(),
            coordinate.longitude(),
            percent_encode(key)
        );
        let body = self.fetch(&url, key)?;
        body.get("words")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.bad_response(&url, key, "missing words"))
    }
}

impl fmt::Debug for What3Words {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("What3Words")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl Service for What3Words {
    fn id(&self) -> ServiceId {
        ServiceId::WHAT3WORDS
    }

    fn name(&self) -> &'static str {
        "What3Words"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText, Tag::ShareLink, Tag::CopyableText]
    }

    fn validate(&self, input: &str) -> bool {
        ADDRESS.anchored.is_match(input.trim())
    }

    fn find_in_text(&self, text: &str) -> Result<Vec<FormatMatch>> {
        Ok(scan_links(self, &ADDRESS.find, text, |raw| self.resolve(raw)))
    }

    fn process(&self, input: &str) -> Result<BetterLocation> {
        let input = input.trim();
        if !self.validate(input) {
            return Err(ServiceError::invalid(format!("'{input}' is not a What3Words address")));
        }
        self.resolve(input)
    }

    fn share_text(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(format!("///{}", self.words(coordinate)?))
    }

    fn share_link(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(format!("https://w3w.co/{}", self.words(coordinate)?))
    }

    fn drive_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::DriveLink))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
