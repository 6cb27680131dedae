use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ownership::{Owned, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Owner. Set once from the authenticated caller.
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field values from a create or update body. There is no owner
/// field, so a body can never move a track to another user.
#[derive(Debug, Clone, Default)]
pub struct TrackChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Track {
    pub fn new(owner: Uuid, changes: TrackChanges) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id: owner,
            title: changes.title,
            description: changes.description,
            genre: changes.genre,
            tags: changes.tags.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the fields present in `changes`.
    pub fn apply(&mut self, changes: TrackChanges) {
        if let Some(title) = changes.title {
            self.title = Some(title);
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(genre) = changes.genre {
            self.genre = Some(genre);
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();
    }
}

impl Owned for Track {
    const KIND: ResourceKind = ResourceKind::Track;

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
