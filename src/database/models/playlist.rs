use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ownership::{Owned, ResourceKind};

/// A playlist references tracks by id; it does not own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub track_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub track_ids: Option<Vec<Uuid>>,
}

impl Playlist {
    pub fn new(owner: Uuid, changes: PlaylistChanges) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id: owner,
            title: changes.title,
            description: changes.description,
            track_ids: changes.track_ids.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: PlaylistChanges) {
        if let Some(title) = changes.title {
            self.title = Some(title);
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(track_ids) = changes.track_ids {
            self.track_ids = track_ids;
        }
        self.updated_at = Utc::now();
    }
}

impl Owned for Playlist {
    const KIND: ResourceKind = ResourceKind::Playlist;

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
