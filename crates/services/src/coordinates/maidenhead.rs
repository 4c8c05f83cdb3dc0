//! Maidenhead locators: `JO70fc`.
//!
//! Locators look like ordinary words, so they are never picked out of
//! prose. Only a whole message (or link) consisting of one locator counts.

use crate::error::{Operation, Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use crate::service::{Service, ServiceId, Tag};
use betterlocation_geo::{maidenhead, Coordinate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Field and square at least, up to seven pairs.
static LOCATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Ra-r]{2}[0-9]{2}(?:[A-Xa-x]{2}(?:[0-9]{2}(?:[A-Xa-x]{2}(?:[0-9]{2}(?:[A-Xa-x]{2})?)?)?)?)?$",
    )
    .unwrap()
});

/// Character pairs used for share text.
const SHARE_PAIRS: usize = maidenhead::MAX_LENGTH / 2;

/// Maidenhead recognizer (ID 7).
#[derive(Debug, Clone, Copy, Default)]
pub struct Maidenhead;

impl Service for Maidenhead {
    fn id(&self) -> ServiceId {
        ServiceId::MAIDENHEAD
    }

    fn name(&self) -> &'static str {
        "Maidenhead"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::CopyableText]
    }

    fn validate(&self, input: &str) -> bool {
        LOCATOR.is_match(input.trim())
    }

    fn find_in_text(&self, _text: &str) -> Result<Vec<FormatMatch>> {
        Err(ServiceError::not_supported(self.name(), Operation::FindInText))
    }

    fn process(&self, input: &str) -> Result<BetterLocation> {
        let input = input.trim();
        if !self.validate(input) {
            return Err(ServiceError::invalid(format!("'{input}' is not a Maidenhead locator")));
        }
        let coordinate = maidenhead::decode(input)?;
        Ok(BetterLocation::new(coordinate, self.id(), self.name(), input))
    }

    fn share_text(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(maidenhead::encode(coordinate, SHARE_PAIRS)?)
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
