//! One-shot catalog fetch: query the document store, decode leniently, and
//! atomically replace the shared list.
//!
//! Malformed documents are skipped with an aggregate count logged at `warn`,
//! never surfaced as a hard error. A load whose completion has been
//! overtaken by a newer one is discarded instead of overwriting fresher
//! state; the caller sees `LoadOutcome::Superseded`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::DocStoreError;
use crate::catalog::Catalog;
use crate::models::resource::Resource;

/// The resource-fetch seam. Implemented by `DocStoreClient`; tests swap in
/// an in-memory fake.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Returns raw resource documents, optionally constrained to documents
    /// whose category field equals `category`.
    async fn fetch_resources(&self, category: Option<&str>) -> Result<Vec<Value>, DocStoreError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { total: usize, skipped: usize },
    Superseded,
}

pub struct CatalogLoader {
    store: Arc<dyn ResourceStore>,
    catalog: Arc<Catalog>,
}

impl CatalogLoader {
    pub fn new(store: Arc<dyn ResourceStore>, catalog: Arc<Catalog>) -> CatalogLoader {
        CatalogLoader { store, catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Fetches and replaces the in-memory list. On backend error the list is
    /// left untouched, so "no matches" and "fetch failed" stay distinct
    /// states for the caller.
    pub async fn load(&self, category: Option<&str>) -> Result<LoadOutcome, DocStoreError> {
        let claimed = self.catalog.claim_generation();

        let documents = self.store.fetch_resources(category).await?;

        let mut skipped = 0usize;
        let resources: Vec<Resource> = documents
            .iter()
            .filter_map(|doc| {
                let decoded = Resource::from_document(doc);
                if decoded.is_none() {
                    skipped += 1;
                }
                decoded
            })
            .collect();

        if skipped > 0 {
            warn!(skipped, category, "dropped malformed resource documents");
        }

        let total = resources.len();
        if !self.catalog.replace_if_current(claimed, resources).await {
            debug!(claimed, category, "discarding superseded catalog load");
            return Ok(LoadOutcome::Superseded);
        }

        debug!(total, skipped, category, "catalog replaced");
        Ok(LoadOutcome::Loaded { total, skipped })
    }
}
