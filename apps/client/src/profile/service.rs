//! Profile reads and edits. Every successful operation publishes the
//! resulting profile through `ProfileState`, so screens observe one source
//! of truth instead of racing independent fetches.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tracing::info;

use crate::backend::DocStoreError;
use crate::errors::AppError;
use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::models::resource::Region;
use crate::profile::schools::SchoolDirectory;
use crate::profile::ProfileState;
use crate::storage::PhotoStore;

/// The profile persistence seam. Implemented by `DocStoreClient`; tests
/// swap in an in-memory fake.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, user_id: &str) -> Result<UserProfile, DocStoreError>;
    async fn patch(&self, user_id: &str, fields: &Value) -> Result<(), DocStoreError>;
}

pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    schools: Arc<SchoolDirectory>,
    state: ProfileState,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        schools: Arc<SchoolDirectory>,
    ) -> ProfileService {
        ProfileService {
            store,
            schools,
            state: ProfileState::new(),
        }
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    /// Fetches the profile and publishes it as the current state.
    pub async fn load(&self, user_id: &str) -> Result<UserProfile, AppError> {
        let profile = self.store.fetch(user_id).await?;
        self.state.publish(profile.clone());
        Ok(profile)
    }

    /// Applies a partial edit, then publishes the resulting profile.
    /// Requires a prior `load`; edits are always relative to known state.
    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile, AppError> {
        if update.is_empty() {
            return Err(AppError::Validation("no profile fields to update".to_string()));
        }
        let mut profile = self
            .state
            .current()
            .ok_or_else(|| AppError::Validation("profile not loaded".to_string()))?;

        self.store.patch(user_id, &update.field_map()).await?;
        update.apply_to(&mut profile);
        self.state.publish(profile.clone());
        Ok(profile)
    }

    /// Declares a new home region. A school that does not exist under the
    /// new region is cleared in the same edit, so a stale school can never
    /// survive a region change.
    pub async fn set_region(&self, user_id: &str, region: Region) -> Result<UserProfile, AppError> {
        let current = self
            .state
            .current()
            .ok_or_else(|| AppError::Validation("profile not loaded".to_string()))?;

        let keep_school = current
            .school
            .as_deref()
            .is_some_and(|school| self.schools.is_valid_school(&region, school));

        let update = ProfileUpdate {
            region: Some(region.clone()),
            clear_school: current.school.is_some() && !keep_school,
            ..Default::default()
        };
        if update.clear_school {
            info!(user_id, region = %region, "region change cleared stale school");
        }
        self.update(user_id, update).await
    }

    /// Picks a school; it must exist under the profile's current region.
    pub async fn set_school(&self, user_id: &str, school: String) -> Result<UserProfile, AppError> {
        let current = self
            .state
            .current()
            .ok_or_else(|| AppError::Validation("profile not loaded".to_string()))?;
        if !self.schools.is_valid_school(&current.region, &school) {
            return Err(AppError::Validation(format!(
                "school '{school}' is not available in region {}",
                current.region
            )));
        }
        self.update(
            user_id,
            ProfileUpdate {
                school: Some(school),
                ..Default::default()
            },
        )
        .await
    }

    /// Uploads a photo blob to the object store and records its URL on the
    /// profile.
    pub async fn upload_photo(
        &self,
        photos: &PhotoStore,
        user_id: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<UserProfile, AppError> {
        let url = photos.upload_profile_photo(user_id, bytes, content_type).await?;
        self.update(
            user_id,
            ProfileUpdate {
                photo_url: Some(url),
                ..Default::default()
            },
        )
        .await
    }

    /// Drops the published state on sign-out.
    pub fn reset(&self) {
        self.state.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        profile: Mutex<Option<UserProfile>>,
        patches: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn fetch(&self, user_id: &str) -> Result<UserProfile, DocStoreError> {
            Ok(self
                .profile
                .lock()
                .await
                .clone()
                .unwrap_or_else(|| UserProfile::new(user_id)))
        }

        async fn patch(&self, _user_id: &str, fields: &Value) -> Result<(), DocStoreError> {
            self.patches.lock().await.push(fields.clone());
            Ok(())
        }
    }

    fn service_with(profile: UserProfile) -> (ProfileService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore {
            profile: Mutex::new(Some(profile)),
            patches: Mutex::new(Vec::new()),
        });
        let service = ProfileService::new(store.clone(), Arc::new(SchoolDirectory::builtin()));
        (service, store)
    }

    fn az_profile() -> UserProfile {
        let mut profile = UserProfile::new("u1");
        profile.region = Region::parse("AZ");
        profile.school = Some("Arizona State University".to_string());
        profile
    }

    #[tokio::test]
    async fn test_load_publishes_state() {
        let (service, _) = service_with(az_profile());
        service.load("u1").await.unwrap();
        assert_eq!(service.state().current().unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn test_region_change_clears_school_not_in_new_region() {
        let (service, store) = service_with(az_profile());
        service.load("u1").await.unwrap();

        let profile = service.set_region("u1", Region::parse("CA")).await.unwrap();
        assert_eq!(profile.region, Region::parse("CA"));
        assert!(profile.school.is_none());

        let patches = store.patches.lock().await;
        assert_eq!(patches[0], json!({ "region": "CA", "school": null }));
    }

    #[tokio::test]
    async fn test_region_change_to_all_clears_school() {
        let (service, _) = service_with(az_profile());
        service.load("u1").await.unwrap();
        let profile = service.set_region("u1", Region::All).await.unwrap();
        assert!(profile.school.is_none());
    }

    #[tokio::test]
    async fn test_set_school_rejects_school_outside_region() {
        let (service, _) = service_with(az_profile());
        service.load("u1").await.unwrap();

        let err = service
            .set_school("u1", "University of Southern California".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_school_accepts_school_in_region() {
        let (service, _) = service_with(az_profile());
        service.load("u1").await.unwrap();

        let profile = service
            .set_school("u1", "University of Arizona".to_string())
            .await
            .unwrap();
        assert_eq!(profile.school.as_deref(), Some("University of Arizona"));
    }

    #[tokio::test]
    async fn test_update_requires_loaded_profile() {
        let (service, _) = service_with(az_profile());
        let err = service
            .update(
                "u1",
                ProfileUpdate {
                    display_name: Some("Sam".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let (service, _) = service_with(az_profile());
        service.load("u1").await.unwrap();
        let err = service
            .update("u1", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
