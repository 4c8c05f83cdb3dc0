//! Configuration loading and schema definitions
//!
//! Settings come from `.betterlocation.toml` (or `--config`), overlaid
//! with `BETTERLOCATION_*` environment variables.

mod loader;
mod schema;

pub use loader::{Config, ENV_GOOGLE_STATIC_MAPS_KEY, ENV_LOG, ENV_W3W_API_KEY};
pub use schema::*;
