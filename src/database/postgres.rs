use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::models::{Playlist, Track, User};
use super::{Store, StoreError, UniqueField};
use crate::config::DatabaseConfig;
use crate::filter::sql::{push_playlist_conditions, push_track_conditions};
use crate::filter::{PlaylistFilter, TrackFilter};

const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Each collection is a table holding the JSONB document plus the columns
/// needed for uniqueness, ownership and date filtering.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT NOT NULL,
        doc JSONB NOT NULL,
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_email_key UNIQUE (email)
    )",
    "CREATE TABLE IF NOT EXISTS tracks (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        doc JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS tracks_user_id_idx ON tracks (user_id)",
    "CREATE TABLE IF NOT EXISTS playlists (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        doc JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS playlists_user_id_idx ON playlists (user_id)",
];

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Opens the pool and creates missing tables.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("Connected Postgres document store");
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn find_user_where(&self, column: &'static str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT doc FROM users WHERE {column} = $1");
        let doc = sqlx::query_scalar::<_, Json<User>>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(user)| user))
    }
}

/// Maps unique violations on the users table to the clashing field.
fn unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let field = match db.constraint() {
                Some(USERNAME_CONSTRAINT) => UniqueField::Username,
                _ => UniqueField::Email,
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed Postgres document store");
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id, username, email, doc) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(Json(user))
            .execute(&self.pool)
            .await
            .map_err(unique_violation)?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<User>>("SELECT doc FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(user)| user))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where("username", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where("email", email).await
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET username = $2, email = $3, doc = $4 WHERE id = $1")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(Json(user))
            .execute(&self.pool)
            .await
            .map_err(unique_violation)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM playlists WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tracks WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_track(&self, track: &Track) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tracks (id, user_id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(track.id)
            .bind(track.user_id)
            .bind(Json(track))
            .bind(track.created_at)
            .bind(track.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_track(&self, id: Uuid) -> Result<Option<Track>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Track>>("SELECT doc FROM tracks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(track)| track))
    }

    async fn list_tracks(&self, owner: Uuid, filter: &TrackFilter) -> Result<Vec<Track>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM tracks WHERE user_id = ");
        qb.push_bind(owner);
        push_track_conditions(&mut qb, filter);
        qb.push(" ORDER BY created_at, id");

        let docs: Vec<Json<Track>> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        Ok(docs.into_iter().map(|Json(track)| track).collect())
    }

    async fn update_track(&self, track: &Track) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE tracks SET doc = $3, updated_at = $4 WHERE id = $1 AND user_id = $2")
            .bind(track.id)
            .bind(track.user_id)
            .bind(Json(track))
            .bind(track.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_track(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn missing_tracks(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let found: HashSet<Uuid> = sqlx::query_scalar::<_, Uuid>("SELECT id FROM tracks WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();
        Ok(ids.iter().filter(|id| !found.contains(id)).copied().collect())
    }

    async fn insert_playlist(&self, playlist: &Playlist) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO playlists (id, user_id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(playlist.id)
            .bind(playlist.user_id)
            .bind(Json(playlist))
            .bind(playlist.created_at)
            .bind(playlist.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Playlist>>("SELECT doc FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(playlist)| playlist))
    }

    async fn list_playlists(&self, owner: Uuid, filter: &PlaylistFilter) -> Result<Vec<Playlist>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM playlists WHERE user_id = ");
        qb.push_bind(owner);
        push_playlist_conditions(&mut qb, filter);
        qb.push(" ORDER BY created_at, id");

        let docs: Vec<Json<Playlist>> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        Ok(docs.into_iter().map(|Json(playlist)| playlist).collect())
    }

    async fn update_playlist(&self, playlist: &Playlist) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE playlists SET doc = $3, updated_at = $4 WHERE id = $1 AND user_id = $2")
            .bind(playlist.id)
            .bind(playlist.user_id)
            .bind(Json(playlist))
            .bind(playlist.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_playlist(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
