//! Error types for the geo crate.

use crate::Axis;
use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur while building or converting coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside of -90..=90
    #[error("Latitude {0} is out of range (-90 to 90)")]
    LatitudeOutOfRange(f64),

    /// Longitude outside of -180..=180
    #[error("Longitude {0} is out of range (-180 to 180)")]
    LongitudeOutOfRange(f64),

    /// Hemisphere symbol both before and after the same number
    #[error("Hemisphere is defined twice for coordinate #{0}")]
    HemisphereDefinedTwice(usize),

    /// Both numbers carry hemisphere symbols of the same axis
    #[error("Both coordinates are {0} hemisphere")]
    SameAxisHemisphere(Axis),

    /// Malformed notation (minutes >= 60, unknown symbol, bad characters)
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Grid reference that does not project to a valid position
    #[error("Invalid grid reference: {0}")]
    InvalidGrid(String),
}

impl GeoError {
    /// Returns true when the error is caused by a value outside valid lat/lon bounds.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            GeoError::LatitudeOutOfRange(_) | GeoError::LongitudeOutOfRange(_)
        )
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::LatitudeOutOfRange(_) | GeoError::LongitudeOutOfRange(_) => {
                GeoErrorCode::OutOfRange
            }
            GeoError::HemisphereDefinedTwice(_) | GeoError::SameAxisHemisphere(_) => {
                GeoErrorCode::AmbiguousHemisphere
            }
            GeoError::InvalidFormat(_) => GeoErrorCode::InvalidFormat,
            GeoError::InvalidGrid(_) => GeoErrorCode::InvalidGrid,
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        GeoError::InvalidFormat(message.into())
    }

    pub(crate) fn grid(message: impl Into<String>) -> Self {
        GeoError::InvalidGrid(message.into())
    }
}

/// Error code for integration with betterlocation-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Latitude or longitude outside valid bounds
    OutOfRange = 10001,
    /// Contradictory hemisphere markers
    AmbiguousHemisphere = 10002,
    /// Malformed notation
    InvalidFormat = 10003,
    /// Grid reference outside its zone
    InvalidGrid = 10004,
}
