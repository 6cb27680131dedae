//! Document persistence for users, tracks and playlists.
//!
//! Handlers only see the [`Store`] trait. [`MemoryStore`] backs development
//! and tests, [`PgStore`] keeps each document as JSONB in Postgres. Both
//! enforce unique usernames and emails, and both make track and playlist
//! writes conditional on the stored owner.

pub mod memory;
pub mod models;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::filter::{PlaylistFilter, TrackFilter};
use models::{Playlist, Track, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// User fields that must be unique across accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn conflict_message(self) -> &'static str {
        match self {
            UniqueField::Username => "Username already taken",
            UniqueField::Email => "Email already in use",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {0:?}")]
    Duplicate(UniqueField),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn kind(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Releases connections. The store must not be used afterwards.
    async fn close(&self);

    // Users
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Returns `false` when no user has `user.id`.
    async fn update_user(&self, user: &User) -> Result<bool, StoreError>;
    /// Removes the user together with every track and playlist they own.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    // Tracks
    async fn insert_track(&self, track: &Track) -> Result<(), StoreError>;
    async fn find_track(&self, id: Uuid) -> Result<Option<Track>, StoreError>;
    async fn list_tracks(&self, owner: Uuid, filter: &TrackFilter) -> Result<Vec<Track>, StoreError>;
    /// Writes only if a track with `track.id` is owned by `track.user_id`.
    async fn update_track(&self, track: &Track) -> Result<bool, StoreError>;
    /// Deletes only if the track is owned by `owner`.
    async fn delete_track(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;
    /// Returns the ids in `ids` that have no track, in input order.
    async fn missing_tracks(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError>;

    // Playlists
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<(), StoreError>;
    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError>;
    async fn list_playlists(&self, owner: Uuid, filter: &PlaylistFilter) -> Result<Vec<Playlist>, StoreError>;
    async fn update_playlist(&self, playlist: &Playlist) -> Result<bool, StoreError>;
    async fn delete_playlist(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;
}

/// Opens the store selected by configuration: Postgres when a URL is set,
/// otherwise an empty in-memory store.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.url {
        Some(url) => Ok(Arc::new(PgStore::connect(url, config).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
