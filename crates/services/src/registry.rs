//! The ordered set of recognizers a scan runs.
//!
//! Order is significant: when two services resolve the same coordinate,
//! the entry from the service registered first survives deduplication.

use crate::coordinates::{Grid, Maidenhead, UtmService, Wgs84};
use crate::error::RegistryError;
use crate::fetch::JsonFetcher;
use crate::service::{Service, ServiceId, Tag};
use crate::web::{
    Bannergress, Geohash, GoogleMaps, IngressIntel, MapyCz, OpenStreetMap, Waze, What3Words,
};
use betterlocation_core::config::ConfigSchema;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Recognizers in discovery order.
#[derive(Default)]
pub struct Registry {
    services: Vec<Box<dyn Service>>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a service after those already registered
    #[must_use]
    pub fn add_service(mut self, service: impl Service + 'static) -> Self {
        self.services.push(Box::new(service));
        self
    }

    /// Every known service, richest first: link services, then the
    /// WGS84 notations from most to least specific, then grid formats.
    ///
    /// Services listed in `[services] disabled` are left out.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateId`] if two services share an ID.
    pub fn standard(
        config: &ConfigSchema,
        fetcher: Arc<dyn JsonFetcher>,
    ) -> Result<Self, RegistryError> {
        let api = &config.api;
        let mut google = GoogleMaps::new();
        if let Some(key) = &api.google_static_maps_key {
            google = google.with_static_maps_key(key.clone());
        }
        let mut what3words = What3Words::new(Arc::clone(&fetcher), api.what3words_base_url.clone());
        if let Some(key) = &api.what3words_key {
            what3words = what3words.with_api_key(key.clone());
        }

        let registry = Self::new()
            .add_service(google)
            .add_service(Waze)
            .add_service(MapyCz)
            .add_service(OpenStreetMap)
            .add_service(IngressIntel)
            .add_service(Bannergress::new(fetcher, api.bannergress_base_url.clone()))
            .add_service(what3words)
            .add_service(Geohash)
            .add_service(Wgs84::degrees_minutes_seconds())
            .add_service(Wgs84::degrees_minutes())
            .add_service(Wgs84::degrees())
            .add_service(Grid::mgrs(config.scan.mgrs_min_digits))
            .add_service(Grid::usng(config.scan.mgrs_min_digits))
            .add_service(UtmService::new(config.scan.utm_min_northing_digits))
            .add_service(Maidenhead)
            .without(&config.services.disabled);

        registry.verify()?;
        tracing::debug!(services = registry.len(), "Registry assembled");
        Ok(registry)
    }

    /// Drops services whose numeric ID is listed.
    #[must_use]
    pub fn without(mut self, disabled: &[u16]) -> Self {
        self.services.retain(|service| {
            let keep = !disabled.contains(&service.id().get());
            if !keep {
                tracing::debug!(service = service.name(), "Service disabled");
            }
            keep
        });
        self
    }

    /// Checks that every ID is used once.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateId`] naming the first clash.
    pub fn verify(&self) -> Result<(), RegistryError> {
        let mut seen: HashMap<ServiceId, &'static str> = HashMap::new();
        for service in &self.services {
            if let Some(first) = seen.insert(service.id(), service.name()) {
                return Err(RegistryError::DuplicateId {
                    id: service.id().get(),
                    first,
                    second: service.name(),
                });
            }
        }
        Ok(())
    }

    /// Looks up a service by numeric ID.
    ///
    /// # Errors
    /// [`RegistryError::UnknownService`] when no registered service owns `id`.
    pub fn get(&self, id: u16) -> Result<&dyn Service, RegistryError> {
        self.services
            .iter()
            .find(|service| service.id().get() == id)
            .map(|service| &**service)
            .ok_or(RegistryError::UnknownService(id))
    }

    /// Services carrying `tag`, in registry order.
    pub fn with_tag(&self, tag: Tag) -> impl Iterator<Item = &dyn Service> {
        self.services().filter(move |service| service.has_tag(tag))
    }

    /// All services in registry order.
    pub fn services(&self) -> impl Iterator<Item = &dyn Service> {
        self.services.iter().map(|service| &**service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.services().map(|service| (service.id().get(), service.name())))
            .finish()
    }
}
