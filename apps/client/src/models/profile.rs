use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::resource::Region;

/// The per-user profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Matches the authentication identity.
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_region")]
    pub region: Region,
    pub school: Option<String>,
    pub photo_url: Option<String>,
}

fn default_region() -> Region {
    Region::All
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> UserProfile {
        UserProfile {
            user_id: user_id.into(),
            display_name: None,
            email: None,
            region: Region::All,
            school: None,
            photo_url: None,
        }
    }
}

/// A partial profile edit, serialized as the partial field map the backend's
/// update operation expects. Unset fields are left untouched server-side;
/// `clear_school` sends an explicit null so a stale school can be removed.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub region: Option<Region>,
    pub school: Option<String>,
    pub clear_school: bool,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    pub fn field_map(&self) -> Value {
        let mut fields = Map::new();
        if let Some(name) = &self.display_name {
            fields.insert("display_name".into(), Value::String(name.clone()));
        }
        if let Some(email) = &self.email {
            fields.insert("email".into(), Value::String(email.clone()));
        }
        if let Some(region) = &self.region {
            fields.insert("region".into(), Value::String(region.as_str().to_string()));
        }
        if self.clear_school {
            fields.insert("school".into(), Value::Null);
        } else if let Some(school) = &self.school {
            fields.insert("school".into(), Value::String(school.clone()));
        }
        if let Some(url) = &self.photo_url {
            fields.insert("photo_url".into(), Value::String(url.clone()));
        }
        Value::Object(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.region.is_none()
            && self.school.is_none()
            && !self.clear_school
            && self.photo_url.is_none()
    }

    /// Applies this edit to an in-memory profile, mirroring what the backend
    /// will persist. Used to publish the post-update state without re-fetching.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.display_name {
            profile.display_name = Some(name.clone());
        }
        if let Some(email) = &self.email {
            profile.email = Some(email.clone());
        }
        if let Some(region) = &self.region {
            profile.region = region.clone();
        }
        if self.clear_school {
            profile.school = None;
        } else if let Some(school) = &self.school {
            profile.school = Some(school.clone());
        }
        if let Some(url) = &self.photo_url {
            profile.photo_url = Some(url.clone());
        }
    }
}
