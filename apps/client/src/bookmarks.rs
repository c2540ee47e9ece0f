#![allow(dead_code)]

//! Saved-resource toggling against the per-user bookmark sub-collection.
//!
//! Create is a keyed PUT (the resource id doubles as the idempotency key)
//! and concurrent toggles of the same resource are refused while one is in
//! flight, so two rapid taps can never leave a duplicate record behind.
//! Guests are barred from bookmarking and get an explanatory prompt.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::backend::auth::Identity;
use crate::backend::DocStoreError;
use crate::errors::AppError;
use crate::models::bookmark::Bookmark;
use crate::models::resource::Resource;

/// The bookmark persistence seam. Implemented by `DocStoreClient`; tests
/// swap in an in-memory fake.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn exists(&self, user_id: &str, resource_id: &str) -> Result<bool, DocStoreError>;
    async fn put(
        &self,
        user_id: &str,
        resource_id: &str,
        bookmark: &Bookmark,
    ) -> Result<(), DocStoreError>;
    async fn delete(&self, user_id: &str, resource_id: &str) -> Result<(), DocStoreError>;
    async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>, DocStoreError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum Toggled {
    Saved,
    Removed,
}

pub struct BookmarkService {
    store: Arc<dyn BookmarkStore>,
    /// Resource ids with a toggle currently in flight.
    in_flight: Mutex<HashSet<String>>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn BookmarkStore>) -> BookmarkService {
        BookmarkService {
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub async fn is_bookmarked(
        &self,
        identity: &Identity,
        resource_id: &str,
    ) -> Result<bool, AppError> {
        if identity.is_anonymous {
            return Ok(false);
        }
        Ok(self.store.exists(&identity.user_id, resource_id).await?)
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<Bookmark>, AppError> {
        if identity.is_anonymous {
            return Err(AppError::GuestsCannotBookmark);
        }
        Ok(self.store.list(&identity.user_id).await?)
    }

    /// Flips the bookmark state of `resource` for this user.
    pub async fn toggle(
        &self,
        identity: &Identity,
        resource: &Resource,
    ) -> Result<Toggled, AppError> {
        if identity.is_anonymous {
            return Err(AppError::GuestsCannotBookmark);
        }

        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(resource.id.clone()) {
                return Err(AppError::BookmarkInFlight);
            }
        }

        let result = self.toggle_inner(&identity.user_id, resource).await;
        self.in_flight.lock().await.remove(&resource.id);
        result
    }

    async fn toggle_inner(&self, user_id: &str, resource: &Resource) -> Result<Toggled, AppError> {
        if self.store.exists(user_id, &resource.id).await? {
            self.store.delete(user_id, &resource.id).await?;
            info!(user_id, resource_id = %resource.id, "bookmark removed");
            Ok(Toggled::Removed)
        } else {
            let bookmark = Bookmark::from_resource(resource);
            self.store.put(user_id, &resource.id, &bookmark).await?;
            info!(user_id, resource_id = %resource.id, "bookmark saved");
            Ok(Toggled::Saved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory bookmark store keyed by (user, resource). The keyed map
    /// makes duplicate records impossible to represent, matching the
    /// backend's keyed-document semantics.
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<(String, String), Bookmark>>,
    }

    impl MemoryStore {
        async fn count(&self, user_id: &str, resource_id: &str) -> usize {
            let key = (user_id.to_string(), resource_id.to_string());
            usize::from(self.records.lock().await.contains_key(&key))
        }
    }

    #[async_trait]
    impl BookmarkStore for MemoryStore {
        async fn exists(&self, user_id: &str, resource_id: &str) -> Result<bool, DocStoreError> {
            let key = (user_id.to_string(), resource_id.to_string());
            Ok(self.records.lock().await.contains_key(&key))
        }

        async fn put(
            &self,
            user_id: &str,
            resource_id: &str,
            bookmark: &Bookmark,
        ) -> Result<(), DocStoreError> {
            let key = (user_id.to_string(), resource_id.to_string());
            self.records.lock().await.insert(key, bookmark.clone());
            Ok(())
        }

        async fn delete(&self, user_id: &str, resource_id: &str) -> Result<(), DocStoreError> {
            let key = (user_id.to_string(), resource_id.to_string());
            self.records.lock().await.remove(&key);
            Ok(())
        }

        async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>, DocStoreError> {
            Ok(self
                .records
                .lock()
                .await
                .iter()
                .filter(|((uid, _), _)| uid == user_id)
                .map(|(_, b)| b.clone())
                .collect())
        }
    }

    fn member() -> Identity {
        Identity {
            user_id: "u1".to_string(),
            token: "t".to_string(),
            is_anonymous: false,
        }
    }

    fn guest() -> Identity {
        Identity {
            user_id: "g1".to_string(),
            token: "t".to_string(),
            is_anonymous: true,
        }
    }

    fn resource() -> Resource {
        Resource {
            id: "res-1".to_string(),
            title: "Food Bank".to_string(),
            phone: None,
            website: None,
            email: None,
            description: None,
            category: Some("food and clothing".to_string()),
            region: None,
        }
    }

    #[tokio::test]
    async fn test_double_toggle_restores_state_without_duplicates() {
        let store = Arc::new(MemoryStore::default());
        let service = BookmarkService::new(store.clone());
        let user = member();
        let res = resource();

        assert_eq!(service.toggle(&user, &res).await.unwrap(), Toggled::Saved);
        assert_eq!(store.count("u1", "res-1").await, 1);
        assert!(service.is_bookmarked(&user, "res-1").await.unwrap());

        assert_eq!(service.toggle(&user, &res).await.unwrap(), Toggled::Removed);
        assert_eq!(store.count("u1", "res-1").await, 0);
        assert!(!service.is_bookmarked(&user, "res-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_guests_are_refused_with_prompt() {
        let service = BookmarkService::new(Arc::new(MemoryStore::default()));
        let err = service.toggle(&guest(), &resource()).await.unwrap_err();
        assert!(matches!(err, AppError::GuestsCannotBookmark));
        assert!(err.user_message().contains("Sign in"));
    }

    #[tokio::test]
    async fn test_guest_is_bookmarked_is_always_false() {
        let service = BookmarkService::new(Arc::new(MemoryStore::default()));
        assert!(!service.is_bookmarked(&guest(), "res-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_toggle_of_same_resource_is_refused() {
        let service = Arc::new(BookmarkService::new(Arc::new(MemoryStore::default())));
        // Simulate an in-flight toggle by holding the guard entry directly.
        service
            .in_flight
            .lock()
            .await
            .insert("res-1".to_string());

        let err = service.toggle(&member(), &resource()).await.unwrap_err();
        assert!(matches!(err, AppError::BookmarkInFlight));

        // Releasing the guard lets the next toggle through.
        service.in_flight.lock().await.remove("res-1");
        assert_eq!(
            service.toggle(&member(), &resource()).await.unwrap(),
            Toggled::Saved
        );
    }

    #[tokio::test]
    async fn test_list_returns_denormalized_records() {
        let service = BookmarkService::new(Arc::new(MemoryStore::default()));
        let user = member();
        service.toggle(&user, &resource()).await.unwrap();

        let saved = service.list(&user).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Food Bank");
        assert_eq!(saved[0].category.as_deref(), Some("food and clothing"));
    }
}
