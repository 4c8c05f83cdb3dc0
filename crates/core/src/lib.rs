//! Core utilities for BetterLocation
//!
//! This crate provides shared functionality used by the services crate and the CLI:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with environment overrides and validation
//! - **Caching**: In-memory TTL cache for remote lookups
//!
//! # Example
//!
//! ```rust,no_run
//! use betterlocation_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! if config.schema.api.what3words_key.is_none() {
//!     eprintln!("What3Words lookups are disabled");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{Cache, CacheConfig};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
}
