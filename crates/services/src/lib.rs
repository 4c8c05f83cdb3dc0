//! Coordinate detection and normalization for BetterLocation
//!
//! This crate provides:
//! - One recognizer per supported notation or map service, behind the
//!   [`Service`] trait
//! - The [`Scanner`], which runs every recognizer over a message and merges
//!   the matches into a deduplicated [`Collection`]
//! - The [`Registry`] of recognizers with stable IDs and capability tags
//! - The [`JsonFetcher`] seam for recognizers that resolve through a remote API
//!
//! # Example
//!
//! ```
//! use betterlocation_core::config::ConfigSchema;
//! use betterlocation_services::{DisabledFetcher, Registry, Scanner};
//! use std::sync::Arc;
//!
//! let registry = Registry::standard(&ConfigSchema::default(), Arc::new(DisabledFetcher)).unwrap();
//! let collection = Scanner::new(registry).scan("Meet at 50.087451,14.420671");
//! assert_eq!(collection.keys(), ["50.087451,14.420671"]);
//! ```

pub mod collection;
pub mod coordinates;
pub mod error;
pub mod fetch;
pub mod location;
pub mod registry;
pub mod scanner;
pub mod service;
pub mod web;

pub use collection::{Collection, CollectionBuilder, Deduplication, Entry, ScanError};
pub use error::{ErrorKind, FetchError, Operation, RegistryError, Result, ServiceError};
pub use fetch::{CachedFetcher, DisabledFetcher, JsonFetcher, MemoryFetcher};
pub use location::{BetterLocation, FormatMatch, Span};
pub use registry::Registry;
pub use scanner::{EntityKind, MessageEntity, Scanner};
pub use service::{Service, ServiceId, Tag};
