//! Configuration schema definitions
//!
//! Every section is optional in the TOML file; missing keys fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// Text scanning behaviour
    #[serde(default)]
    pub scan: ScanConfig,

    /// Service selection
    #[serde(default)]
    pub services: ServicesConfig,

    /// Credentials and endpoints for remote services
    #[serde(default)]
    pub api: ApiConfig,

    /// Lookup cache for remote responses
    #[serde(default)]
    pub cache: CacheSettings,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Text scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Run services on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Drop locations whose coordinate key was already seen
    #[serde(default = "default_true")]
    pub deduplicate: bool,

    /// Digits per axis an MGRS/USNG reference needs to be picked out of free text
    #[serde(default = "default_mgrs_min_digits")]
    pub mgrs_min_digits: u8,

    /// Digits a UTM northing needs to be picked out of free text
    #[serde(default = "default_utm_min_northing_digits")]
    pub utm_min_northing_digits: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            deduplicate: true,
            mgrs_min_digits: default_mgrs_min_digits(),
            utm_min_northing_digits: default_utm_min_northing_digits(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mgrs_min_digits() -> u8 {
    3
}

fn default_utm_min_northing_digits() -> u8 {
    6
}

/// Service selection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServicesConfig {
    /// Service IDs that are never consulted
    #[serde(default)]
    pub disabled: Vec<u16>,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// What3Words API key
    #[serde(default)]
    pub what3words_key: Option<String>,

    /// What3Words API base URL
    #[serde(default = "default_what3words_base_url")]
    pub what3words_base_url: String,

    /// Bannergress API base URL
    #[serde(default = "default_bannergress_base_url")]
    pub bannergress_base_url: String,

    /// Google Static Maps API key
    #[serde(default)]
    pub google_static_maps_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            what3words_key: None,
            what3words_base_url: default_what3words_base_url(),
            bannergress_base_url: default_bannergress_base_url(),
            google_static_maps_key: None,
        }
    }
}

fn default_what3words_base_url() -> String {
    "https://api.what3words.com/v3".to_string()
}

fn default_bannergress_base_url() -> String {
    "https://api.bannergress.com".to_string()
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    /// Seconds a remote response stays valid (0 = never expires)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Entries kept before the oldest are evicted
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    1024
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `betterlocation_services=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let schema: ConfigSchema = toml::from_str("").unwrap();
        assert_eq!(schema, ConfigSchema::default());
        assert!(schema.scan.parallel);
        assert_eq!(schema.scan.mgrs_min_digits, 3);
        assert_eq!(schema.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_partial_sections() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [scan]
            deduplicate = false

            [services]
            disabled = [9, 15]

            [api]
            what3words_key = "ABCD1234"
            "#,
        )
        .unwrap();

        assert!(!schema.scan.deduplicate);
        assert!(schema.scan.parallel);
        assert_eq!(schema.services.disabled, vec![9, 15]);
        assert_eq!(schema.api.what3words_key.as_deref(), Some("ABCD1234"));
        assert_eq!(schema.api.bannergress_base_url, "https://api.bannergress.com");
    }
}
