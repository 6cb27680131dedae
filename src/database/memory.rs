use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Playlist, Track, User};
use super::{Store, StoreError, UniqueField};
use crate::filter::{PlaylistFilter, TrackFilter};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    tracks: HashMap<Uuid, Track>,
    playlists: HashMap<Uuid, Playlist>,
}

impl Collections {
    /// Finds a unique-field clash with any user other than `user.id`.
    fn clash(&self, user: &User) -> Option<UniqueField> {
        let mut clash = None;
        for other in self.users.values().filter(|u| u.id != user.id) {
            if other.username == user.username {
                return Some(UniqueField::Username);
            }
            if other.email == user.email {
                clash = Some(UniqueField::Email);
            }
        }
        clash
    }
}

/// Process-local store. Each operation holds the lock for its whole
/// check-and-write, so conditional writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {
        let mut collections = self.collections.write().await;
        *collections = Collections::default();
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(field) = collections.clash(user) {
            return Err(StoreError::Duplicate(field));
        }
        collections.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.collections.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        if !collections.users.contains_key(&user.id) {
            return Ok(false);
        }
        if let Some(field) = collections.clash(user) {
            return Err(StoreError::Duplicate(field));
        }
        collections.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        if collections.users.remove(&id).is_none() {
            return Ok(false);
        }
        collections.tracks.retain(|_, t| t.user_id != id);
        collections.playlists.retain(|_, p| p.user_id != id);
        Ok(true)
    }

    async fn insert_track(&self, track: &Track) -> Result<(), StoreError> {
        self.collections.write().await.tracks.insert(track.id, track.clone());
        Ok(())
    }

    async fn find_track(&self, id: Uuid) -> Result<Option<Track>, StoreError> {
        Ok(self.collections.read().await.tracks.get(&id).cloned())
    }

    async fn list_tracks(&self, owner: Uuid, filter: &TrackFilter) -> Result<Vec<Track>, StoreError> {
        let collections = self.collections.read().await;
        let mut tracks: Vec<Track> = collections
            .tracks
            .values()
            .filter(|t| t.user_id == owner && filter.matches(t))
            .cloned()
            .collect();
        tracks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tracks)
    }

    async fn update_track(&self, track: &Track) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        match collections.tracks.get_mut(&track.id) {
            Some(stored) if stored.user_id == track.user_id => {
                *stored = track.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_track(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        match collections.tracks.get(&id) {
            Some(stored) if stored.user_id == owner => {
                collections.tracks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn missing_tracks(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let collections = self.collections.read().await;
        Ok(ids.iter().filter(|id| !collections.tracks.contains_key(id)).copied().collect())
    }

    async fn insert_playlist(&self, playlist: &Playlist) -> Result<(), StoreError> {
        self.collections.write().await.playlists.insert(playlist.id, playlist.clone());
        Ok(())
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError> {
        Ok(self.collections.read().await.playlists.get(&id).cloned())
    }

    async fn list_playlists(&self, owner: Uuid, filter: &PlaylistFilter) -> Result<Vec<Playlist>, StoreError> {
        let collections = self.collections.read().await;
        let mut playlists: Vec<Playlist> = collections
            .playlists
            .values()
            .filter(|p| p.user_id == owner && filter.matches(p))
            .cloned()
            .collect();
        playlists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(playlists)
    }

    async fn update_playlist(&self, playlist: &Playlist) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        match collections.playlists.get_mut(&playlist.id) {
            Some(stored) if stored.user_id == playlist.user_id => {
                *stored = playlist.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_playlist(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        match collections.playlists.get(&id) {
            Some(stored) if stored.user_id == owner => {
                collections.playlists.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
