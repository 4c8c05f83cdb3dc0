//! The recognizer contract every supported format implements.

use crate::error::{Result, ServiceError};
use crate::location::{BetterLocation, FormatMatch};
use betterlocation_geo::Coordinate;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

/// Stable numeric identifier of a service.
///
/// IDs are persisted by consumers and are never renumbered or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceId(NonZeroU16);

impl ServiceId {
    pub const WGS84_DEGREES: Self = Self::from_raw(1);
    pub const WGS84_DEGREES_MINUTES: Self = Self::from_raw(2);
    pub const WGS84_DEGREES_MINUTES_SECONDS: Self = Self::from_raw(3);
    pub const MGRS: Self = Self::from_raw(4);
    pub const USNG: Self = Self::from_raw(5);
    pub const UTM: Self = Self::from_raw(6);
    pub const MAIDENHEAD: Self = Self::from_raw(7);
    pub const GEOHASH: Self = Self::from_raw(8);
    pub const WHAT3WORDS: Self = Self::from_raw(9);
    pub const GOOGLE_MAPS: Self = Self::from_raw(10);
    pub const WAZE: Self = Self::from_raw(11);
    pub const MAPY_CZ: Self = Self::from_raw(12);
    pub const OPENSTREETMAP: Self = Self::from_raw(13);
    pub const INGRESS_INTEL: Self = Self::from_raw(14);
    pub const BANNERGRESS: Self = Self::from_raw(15);

    const fn from_raw(id: u16) -> Self {
        match NonZeroU16::new(id) {
            Some(id) => Self(id),
            None => panic!("service IDs start at 1"),
        }
    }

    /// `None` for zero.
    pub fn new(id: u16) -> Option<Self> {
        NonZeroU16::new(id).map(Self)
    }

    /// Numeric value.
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability tags gating the optional operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// Matches can be picked out of surrounding prose
    FreeText,
    ShareLink,
    DriveLink,
    /// Coordinate can be rendered in the format's notation
    CopyableText,
    StaticImage,
}

impl Tag {
    /// All tags, in declaration order.
    pub const ALL: [Tag; 5] = [
        Tag::FreeText,
        Tag::ShareLink,
        Tag::DriveLink,
        Tag::CopyableText,
        Tag::StaticImage,
    ];

    /// Kebab-case name used in CLI flags and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::FreeText => "free-text",
            Tag::ShareLink => "share-link",
            Tag::DriveLink => "drive-link",
            Tag::CopyableText => "copyable-text",
            Tag::StaticImage => "static-image",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ServiceError::invalid(format!("Unknown tag '{s}'")))
    }
}

/// One supported coordinate notation or map service.
///
/// Every method is required. Operations a format can never provide return
/// [`ServiceError::NotSupported`]; the tags say which ones are meaningful.
pub trait Service: Send + Sync + fmt::Debug {
    /// Stable ID.
    fn id(&self) -> ServiceId;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Capability tags.
    fn tags(&self) -> &'static [Tag];

    /// Anchored syntactic check of the whole input.
    fn validate(&self, input: &str) -> bool;

    /// Every match in `text`, resolved or not, in text order.
    ///
    /// # Errors
    /// [`ServiceError::NotSupported`] for services without [`Tag::FreeText`].
    fn find_in_text(&self, text: &str) -> Result<Vec<FormatMatch>>;

    /// Converts a whole input that passed [`Service::validate`].
    fn process(&self, input: &str) -> Result<BetterLocation>;

    /// Coordinate rendered in this format's notation.
    fn share_text(&self, coordinate: &Coordinate) -> Result<String>;

    /// Link opening the coordinate in this service.
    fn share_link(&self, coordinate: &Coordinate) -> Result<String>;

    /// Link starting navigation to the coordinate.
    fn drive_link(&self, coordinate: &Coordinate) -> Result<String>;

    /// Link to a rendered map image of the coordinate.
    fn static_image_link(&self, coordinate: &Coordinate) -> Result<String>;

    /// Whether the service carries `tag`.
    fn has_tag(&self, tag: Tag) -> bool {
        self.tags().contains(&tag)
    }
}
