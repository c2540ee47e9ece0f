use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::resource::Resource;

/// A saved-resource record in the user's bookmark sub-collection.
///
/// Presence of the record is the bookmark fact; the remaining fields are a
/// denormalized copy of the resource for display without a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub resource_id: String,
    pub title: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn from_resource(resource: &Resource) -> Bookmark {
        Bookmark {
            resource_id: resource.id.clone(),
            title: resource.title.clone(),
            phone: resource.phone.clone(),
            website: resource.website.clone(),
            category: resource.category.clone(),
            saved_at: Utc::now(),
        }
    }
}
