//! Runs every registered recognizer over a message and merges the results.
//!
//! Recognizers scan the full text independently and may overlap. Their
//! matches are pooled in registry order, then deduplicated by coordinate
//! key so the earliest registered service wins.

use crate::collection::{Collection, CollectionBuilder, Deduplication};
use crate::location::{FormatMatch, Span};
use crate::registry::Registry;
use crate::service::{Service, Tag};
use betterlocation_core::config::ScanConfig;
use betterlocation_telemetry::{metrics, Timer};
use tracing::{debug, instrument, warn};

/// What a messaging platform already knows about part of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// The span is a URL written in the text
    Url,
    /// The span is link text hiding this URL
    TextLink(String),
}

/// A platform-supplied annotation of a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntity {
    pub span: Span,
    pub kind: EntityKind,
}

impl MessageEntity {
    pub fn url(offset: usize, length: usize) -> Self {
        Self {
            span: Span::new(offset, length),
            kind: EntityKind::Url,
        }
    }

    pub fn text_link(offset: usize, length: usize, url: impl Into<String>) -> Self {
        Self {
            span: Span::new(offset, length),
            kind: EntityKind::TextLink(url.into()),
        }
    }
}

/// Scan pipeline over a [`Registry`].
#[derive(Debug)]
pub struct Scanner {
    registry: Registry,
    parallel: bool,
    deduplication: Deduplication,
}

impl Scanner {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            parallel: true,
            deduplication: Deduplication::Enabled,
        }
    }

    /// Applies the `[scan]` settings.
    pub fn from_config(registry: Registry, config: &ScanConfig) -> Self {
        Self::new(registry)
            .with_parallel(config.parallel)
            .with_deduplication(config.deduplicate.into())
    }

    /// Runs recognizers on the rayon pool. Ignored without the `parallel`
    /// feature.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_deduplication(mut self, deduplication: Deduplication) -> Self {
        self.deduplication = deduplication;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Scans plain text.
    pub fn scan(&self, text: &str) -> Collection {
        self.scan_message(text, &[])
    }

    /// Scans text together with the platform's entities.
    ///
    /// Hidden URLs of [`EntityKind::TextLink`] entities are scanned by every
    /// service, and their matches report the entity's span.
    #[instrument(skip_all, fields(text_len = text.len(), entities = entities.len()))]
    pub fn scan_message(&self, text: &str, entities: &[MessageEntity]) -> Collection {
        let timer = Timer::start("scan.duration_ms");

        let mut builder = CollectionBuilder::new();
        for (service, found) in self.collect(text, entities) {
            record(service, &found);
            builder.extend(service.name(), found);
        }
        let pending = builder.pending();
        let collection = builder.finish(self.deduplication);
        let elapsed = timer.stop();

        metrics().increment("scan.messages");
        debug!(
            matches = pending,
            locations = collection.len(),
            errors = collection.errors().count(),
            elapsed_ms = elapsed.as_millis(),
            "Scan finished"
        );
        collection
    }

    /// Matches of every service, in registry order.
    fn collect<'a>(
        &'a self,
        text: &str,
        entities: &[MessageEntity],
    ) -> Vec<(&'a dyn Service, Vec<FormatMatch>)> {
        let services: Vec<&dyn Service> = self.registry.services().collect();

        #[cfg(feature = "parallel")]
        if self.parallel {
            use rayon::prelude::*;
            return services
                .par_iter()
                .map(|&service| (service, matches(service, text, entities)))
                .collect();
        }

        services
            .into_iter()
            .map(|service| (service, matches(service, text, entities)))
            .collect()
    }
}

/// Everything one service recognizes in the message.
fn matches(service: &dyn Service, text: &str, entities: &[MessageEntity]) -> Vec<FormatMatch> {
    let free_text = service.has_tag(Tag::FreeText);
    let mut found = Vec::new();

    let trimmed = text.trim();
    let whole = Span::new(text.len() - text.trim_start().len(), trimmed.len());
    if free_text {
        found.extend(find(service, text));
    } else if let Some(m) = whole_input(service, trimmed, whole) {
        found.push(m);
    }

    for entity in entities {
        match &entity.kind {
            // free-text services already saw it in the message
            EntityKind::Url if !free_text && entity.span != whole => {
                let Some(url) = text.get(entity.span.offset..entity.span.end()) else {
                    warn!(offset = entity.span.offset, "URL entity outside the message");
                    continue;
                };
                found.extend(whole_input(service, url, entity.span));
            }
            EntityKind::Url => {}
            EntityKind::TextLink(url) if free_text => {
                found.extend(find(service, url).into_iter().map(|mut m| {
                    m.span = entity.span;
                    m
                }));
            }
            EntityKind::TextLink(url) => {
                found.extend(whole_input(service, url.trim(), entity.span));
            }
        }
    }
    found
}

fn find(service: &dyn Service, text: &str) -> Vec<FormatMatch> {
    match service.find_in_text(text) {
        Ok(found) => found,
        Err(e) => {
            warn!(service = service.name(), error = %e, "Free-text scan failed");
            Vec::new()
        }
    }
}

fn whole_input(service: &dyn Service, input: &str, span: Span) -> Option<FormatMatch> {
    if input.is_empty() || !service.validate(input) {
        return None;
    }
    Some(FormatMatch::new(input, span, service.id(), service.process(input)))
}

fn record(service: &dyn Service, found: &[FormatMatch]) {
    for m in found {
        match &m.result {
            Ok(location) => {
                metrics().increment(&format!("scan.service.{}.hits", service.id()));
                debug!(
                    service = service.name(),
                    offset = m.span.offset,
                    key = %location.key(),
                    "Match resolved"
                );
            }
            Err(e) => {
                metrics().increment(&format!("scan.service.{}.errors", service.id()));
                debug!(
                    service = service.name(),
                    offset = m.span.offset,
                    kind = ?e.kind(),
                    error = %e,
                    "Match failed"
                );
            }
        }
    }
}
