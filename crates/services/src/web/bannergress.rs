//! Bannergress banner pages, resolved to the first mission's start point.

use super::scan_links;
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

static LINK: Lazy<Patterns> = Lazy::new(|| {
    Patterns::new(
        r"(?i)\b(?:https?://)?(?:www\.)?bannergress\.com/banner/(?P<slug>[a-z0-9-]+)\b(?:[?#][^\s<>]*)?",
    )
});

/// Bannergress recognizer (ID 15).
pub struct Bannergress {
    fetcher: Arc<dyn JsonFetcher>,
    base_url: String,
}

impl Bannergress {
    /// `base_url` is the API root, e.g. `https://api.bannergress.com`.
    pub fn new(fetcher: Arc<dyn JsonFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, raw: &str) -> Result<BetterLocation> {
        let slug = LINK
            .find
            .captures(raw)
            .and_then(|caps| caps.name("slug"))
            .ok_or_else(|| ServiceError::invalid(format!("'{raw}' names no banner")))?
            .as_str()
            .to_ascii_lowercase();

        let url = format!("{}/bnrs/{}", self.base_url, slug);
        let body = self.fetcher.get(&url).map_err(|source| {
            tracing::warn!(url = %url, error = %source, "Bannergress lookup failed");
            ServiceError::External {
                service: self.name(),
                source,
            }
        })?;

        let (lat, lon) = start_point(&body).ok_or_else(|| {
            tracing::warn!(url = %url, "Bannergress response has no start point");
            ServiceError::External {
                service: self.name(),
                source: FetchError::BadResponse {
                    url: url.clone(),
                    message: "missing startLatitude/startLongitude".to_string(),
                },
            }
        })?;

        let mut location = BetterLocation::new(Coordinate::new(lat, lon)?, self.id(), self.name(), raw)
            .with_sub_type("Banner start");
        if let Some(title) = body.get("title").and_then(Value::as_str) {
            location = location.with_description(title);
        }
        Ok(location)
    }
}

fn start_point(body: &Value) -> Option<(f64, f64)> {
    Some((
        body.get("startLatitude")?.as_f64()?,
        body.get("startLongitude")?.as_f64()?,
    ))
}

impl fmt::Debug for Bannergress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bannergress")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Service for Bannergress {
    fn id(&self) -> ServiceId {
        ServiceId::BANNERGRESS
    }

    fn name(&self) -> &'static str {
        "Bannergress"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::FreeText]
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
            return Err(ServiceError::invalid(format!("'{input}' is not a Bannergress link")));
        }
        self.resolve(input)
    }

    fn share_text(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareText))
    }

    fn share_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::ShareLink))
    }

    fn drive_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::DriveLink))
    }

    fn static_image_link(&self, _coordinate: &Coordinate) -> Result<String> {
        Err(ServiceError::not_supported(self.name(), Operation::StaticImage))
    }
}
