//! Error types for the services crate.

use betterlocation_geo::GeoError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Optional operations a service may decline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Scanning prose for matches
    FindInText,
    /// Rendering the coordinate in the service's own notation
    ShareText,
    /// Link that opens the service
    ShareLink,
    /// Link that starts navigation
    DriveLink,
    /// Link to a rendered map image
    StaticImage,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::FindInText => "finding in text",
            Operation::ShareText => "share text",
            Operation::ShareLink => "share link",
            Operation::DriveLink => "drive link",
            Operation::StaticImage => "static image",
        })
    }
}

/// Errors produced while recognizing or rendering a location.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Text looked like the format but could not be read
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Conversion failed (hemisphere conflicts, out-of-range values, bad grid)
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// The format can never provide this operation
    #[error("{service} does not support {operation}")]
    NotSupported {
        service: &'static str,
        operation: Operation,
    },

    /// The operation exists for this format but is not built yet
    #[error("{operation} for {service} is not implemented yet")]
    NotImplemented {
        service: &'static str,
        operation: Operation,
    },

    /// A credential the operation needs is missing
    #[error("{service} needs {what}, which is not configured")]
    NotConfigured {
        service: &'static str,
        what: &'static str,
    },

    /// The remote collaborator failed
    #[error("{service} lookup failed: {source}")]
    External {
        service: &'static str,
        #[source]
        source: FetchError,
    },
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Superficial match that failed strict reading
    InvalidInputFormat,
    /// Value outside latitude/longitude bounds
    OutOfRange,
    /// Permanent: the format has no such representation
    UnsupportedOperation,
    /// Temporary: not built yet
    NotImplemented,
    /// Remote lookup or its configuration failed
    ExternalDependencyFailure,
}

impl ServiceError {
    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInputFormat,
            ServiceError::Geo(e) if e.is_out_of_range() => ErrorKind::OutOfRange,
            ServiceError::Geo(_) => ErrorKind::InvalidInputFormat,
            ServiceError::NotSupported { .. } => ErrorKind::UnsupportedOperation,
            ServiceError::NotImplemented { .. } => ErrorKind::NotImplemented,
            ServiceError::NotConfigured { .. } | ServiceError::External { .. } => {
                ErrorKind::ExternalDependencyFailure
            }
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> u32 {
        match self {
            ServiceError::InvalidInput(_) => ServiceErrorCode::InvalidInput as u32,
            ServiceError::Geo(e) => e.code() as u32,
            ServiceError::NotSupported { .. } => ServiceErrorCode::NotSupported as u32,
            ServiceError::NotImplemented { .. } => ServiceErrorCode::NotImplemented as u32,
            ServiceError::NotConfigured { .. } => ServiceErrorCode::NotConfigured as u32,
            ServiceError::External { .. } => ServiceErrorCode::External as u32,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    pub(crate) fn not_supported(service: &'static str, operation: Operation) -> Self {
        ServiceError::NotSupported { service, operation }
    }
}

/// Error code for integration with betterlocation-core error handling.
/// Range: 11xxx for service errors (geo errors keep their 10xxx codes).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorCode {
    InvalidInput = 11001,
    NotSupported = 11002,
    NotImplemented = 11003,
    NotConfigured = 11004,
    External = 11005,
}

/// Failures of the injected JSON fetcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Connection-level failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Body was not the expected JSON shape
    #[error("Unexpected response from {url}: {message}")]
    BadResponse { url: String, message: String },

    /// No fetcher is wired in
    #[error("Remote lookups are disabled")]
    Unavailable,
}

impl FetchError {
    /// Replaces every occurrence of `secret`, raw or percent-encoded, in the
    /// stored URL and message.
    #[must_use]
    pub fn redact(self, secret: &str) -> Self {
        if secret.is_empty() {
            return self;
        }
        let encoded = urlencoding::encode(secret);
        let scrub = |text: String| text.replace(&*encoded, "<redacted>").replace(secret, "<redacted>");
        match self {
            FetchError::Transport { url, message } => FetchError::Transport {
                url: scrub(url),
                message: scrub(message),
            },
            FetchError::Status { url, status } => FetchError::Status {
                url: scrub(url),
                status,
            },
            FetchError::BadResponse { url, message } => FetchError::BadResponse {
                url: scrub(url),
                message: scrub(message),
            },
            FetchError::Unavailable => FetchError::Unavailable,
        }
    }
}

/// Errors raised while assembling a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two services claim the same ID
    #[error("Service ID {id} is used by both {first} and {second}")]
    DuplicateId {
        id: u16,
        first: &'static str,
        second: &'static str,
    },

    /// Lookup of an ID nobody owns
    #[error("Unknown service ID {0}")]
    UnknownService(u16),
}

impl RegistryError {
    /// Returns the error code for this error.
    pub fn code(&self) -> u32 {
        match self {
            RegistryError::DuplicateId { .. } => 12001,
            RegistryError::UnknownService(_) => 12002,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ServiceError::from(GeoError::LongitudeOutOfRange(200.5)).kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            ServiceError::from(GeoError::HemisphereDefinedTwice(1)).kind(),
            ErrorKind::InvalidInputFormat
        );
        assert_eq!(
            ServiceError::not_supported("WGS84", Operation::ShareLink).kind(),
            ErrorKind::UnsupportedOperation
        );
        assert_eq!(
            ServiceError::NotConfigured {
                service: "Google Maps",
                what: "a static maps API key"
            }
            .kind(),
            ErrorKind::ExternalDependencyFailure
        );
    }

    #[test]
    fn test_codes_keep_geo_range() {
        assert_eq!(ServiceError::from(GeoError::LatitudeOutOfRange(91.0)).code(), 10001);
        assert_eq!(ServiceError::invalid("x").code(), 11001);
        assert_eq!(RegistryError::UnknownService(99).code(), 12002);
    }

    #[test]
    fn test_messages() {
        let err = ServiceError::not_supported("WGS84", Operation::DriveLink);
        assert_eq!(err.to_string(), "WGS84 does not support drive link");

        let err = ServiceError::External {
            service: "Bannergress",
            source: FetchError::Status {
                url: "https://api.bannergress.com/bnrs/x".to_string(),
                status: 404,
            },
        };
        assert!(err.to_string().contains("status 404"));
    }

    #[test]
    fn test_redact_scrubs_url_and_message() {
        let err = FetchError::Status {
            url: "https://api.test/v3/x?key=a%2Fb".to_string(),
            status: 401,
        }
        .redact("a/b");
        assert_eq!(err.to_string(), "https://api.test/v3/x?key=<redacted> returned status 401");

        let err = FetchError::Transport {
            url: "https://api.test/?key=s3cret".to_string(),
            message: "refused for s3cret".to_string(),
        }
        .redact("s3cret");
        assert!(!err.to_string().contains("s3cret"));
        assert_eq!(FetchError::Unavailable.redact("s3cret"), FetchError::Unavailable);
    }
}
