#![allow(dead_code)]

pub mod filter;
pub mod loader;

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::models::resource::{Region, Resource};

/// The shared in-memory resource list for a screen, plus the load-generation
/// counter used to discard superseded fetch completions.
#[derive(Default)]
pub struct Catalog {
    resources: RwLock<Vec<Resource>>,
    generation: AtomicU64,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    /// Claims the next load generation. The matching `replace_if_current`
    /// only takes effect while no newer generation has been claimed.
    pub(crate) fn claim_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replaces the list if `claimed` is still the newest generation.
    /// Returns false when the load has been superseded.
    pub(crate) async fn replace_if_current(&self, claimed: u64, resources: Vec<Resource>) -> bool {
        let mut list = self.resources.write().await;
        if self.generation.load(Ordering::SeqCst) != claimed {
            return false;
        }
        *list = resources;
        true
    }

    pub async fn snapshot(&self) -> Vec<Resource> {
        self.resources.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    /// Convenience: snapshot then filter, cloning the visible subset.
    pub async fn visible(&self, query: &str, selected_tag: &str, user_region: &Region) -> Vec<Resource> {
        let list = self.resources.read().await;
        filter::filter(&list, query, selected_tag, user_region)
            .into_iter()
            .cloned()
            .collect()
    }
}
