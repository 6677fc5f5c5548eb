//! Read-only fixture data: stores, promotional events and curations.
//!
//! The bundled catalog is embedded at compile time and never changes after
//! load. A fresh `revision` distinguishes one load from another for
//! memoization.

use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{error, info};

use crate::model::{Curation, EventId, PromoEvent, Store, StoreId};

const STORES_JSON: &str = include_str!("../data/stores.json");
const EVENTS_JSON: &str = include_str!("../data/events.json");
const CURATIONS_JSON: &str = include_str!("../data/curations.json");

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("store not found: {0}")]
    StoreNotFound(StoreId),

    #[error("event not found: {0}")]
    EventNotFound(EventId),

    #[error("failed to parse {fixture} fixture: {source}")]
    Parse {
        fixture: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate {fixture} id: {id}")]
    DuplicateId { fixture: &'static str, id: String },

    #[error("store {id} has invalid coordinates: {reason}")]
    InvalidCoordinates { id: StoreId, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stores: Vec<Store>,
    events: Vec<PromoEvent>,
    curations: Vec<Curation>,
    revision: u64,
}

impl Catalog {
    pub fn new(
        stores: Vec<Store>,
        events: Vec<PromoEvent>,
        curations: Vec<Curation>,
    ) -> Result<Self, CatalogError> {
        ensure_unique("store", stores.iter().map(|s| s.id.as_str()))?;
        ensure_unique("event", events.iter().map(|e| e.id.as_str()))?;
        ensure_unique("curation", curations.iter().map(|c| c.id.as_str()))?;

        for store in &stores {
            store
                .coordinates
                .validate()
                .map_err(|e| CatalogError::InvalidCoordinates {
                    id: store.id.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self {
            stores,
            events,
            curations,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// The fixtures shipped with the app.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(STORES_JSON, EVENTS_JSON, CURATIONS_JSON)
    }

    /// Falls back to an empty catalog (every list renders its empty state)
    /// when the bundled fixtures fail to parse.
    #[must_use]
    pub fn bundled_or_empty() -> Self {
        match Self::bundled() {
            Ok(catalog) => {
                info!(
                    stores = catalog.stores.len(),
                    events = catalog.events.len(),
                    curations = catalog.curations.len(),
                    "Loaded bundled catalog"
                );
                catalog
            }
            Err(e) => {
                error!(error = %e, "Bundled catalog is unusable, starting empty");
                Self::default()
            }
        }
    }

    pub fn from_json(stores: &str, events: &str, curations: &str) -> Result<Self, CatalogError> {
        Self::new(
            parse("store", stores)?,
            parse("event", events)?,
            parse("curation", curations)?,
        )
    }

    #[must_use]
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    #[must_use]
    pub fn events(&self) -> &[PromoEvent] {
        &self.events
    }

    #[must_use]
    pub fn curations(&self) -> &[Curation] {
        &self.curations
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn store(&self, id: &StoreId) -> Result<&Store, CatalogError> {
        self.stores
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| CatalogError::StoreNotFound(id.clone()))
    }

    pub fn event(&self, id: &EventId) -> Result<&PromoEvent, CatalogError> {
        self.events
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| CatalogError::EventNotFound(id.clone()))
    }

    /// Maps positions produced by the discovery pipeline back to stores.
    /// Positions from another catalog are skipped rather than trusted.
    #[must_use]
    pub fn resolve(&self, positions: &[usize]) -> Vec<&Store> {
        positions.iter().filter_map(|&i| self.stores.get(i)).collect()
    }
}

fn parse<T: DeserializeOwned>(fixture: &'static str, json: &str) -> Result<Vec<T>, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse { fixture, source })
}

fn ensure_unique<'a>(
    fixture: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                fixture,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
