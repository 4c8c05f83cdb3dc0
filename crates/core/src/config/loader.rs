//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::Path;

/// Environment variable holding the What3Words API key
pub const ENV_W3W_API_KEY: &str = "BETTERLOCATION_W3W_API_KEY";
/// Environment variable holding the Google Static Maps API key
pub const ENV_GOOGLE_STATIC_MAPS_KEY: &str = "BETTERLOCATION_GOOGLE_STATIC_MAPS_KEY";
/// Environment variable overriding the log filter
pub const ENV_LOG: &str = "BETTERLOCATION_LOG";

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings were read from, if any
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or the first standard location
    /// that exists, then apply environment overrides and validate.
    ///
    /// An explicit `path` must exist; discovered files are optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !Path::new(p).exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_string()),
            None => find_config_file(),
        };

        let schema = if let Some(p) = &config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        let config = Self {
            schema,
            path: config_path,
        }
        .with_env_overrides(|name| std::env::var(name).ok());
        let source = config.path.as_deref().unwrap_or("built-in defaults");
        config
            .validate()
            .context(format!("Validating configuration from {source}"))
            .with_suggestion("Fix the value in the configuration file or the BETTERLOCATION_* environment")?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (no discovery, no env)
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = Self {
            schema: toml::from_str(content)?,
            path: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_W3W_API_KEY) {
            self.schema.api.what3words_key = Some(key);
        }
        if let Some(key) = non_empty(ENV_GOOGLE_STATIC_MAPS_KEY) {
            self.schema.api.google_static_maps_key = Some(key);
        }
        if let Some(level) = non_empty(ENV_LOG) {
            self.schema.logging.level = level;
        }
        self
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        let scan = &self.schema.scan;
        if !(1..=5).contains(&scan.mgrs_min_digits) {
            return Err(Error::config_invalid(format!(
                "scan.mgrs_min_digits must be 1-5, got {}",
                scan.mgrs_min_digits
            )));
        }
        if !(1..=7).contains(&scan.utm_min_northing_digits) {
            return Err(Error::config_invalid(format!(
                "scan.utm_min_northing_digits must be 1-7, got {}",
                scan.utm_min_northing_digits
            )));
        }
        if self.schema.cache.max_entries == 0 {
            return Err(Error::config_invalid("cache.max_entries must be at least 1"));
        }
        if self.schema.services.disabled.contains(&0) {
            return Err(Error::config_invalid("services.disabled contains 0, IDs start at 1"));
        }
        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        ".betterlocation.toml",
        "betterlocation.toml",
        ".config/betterlocation.toml",
    ];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading config file {path}"))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Parsing config file {path}"))
}
