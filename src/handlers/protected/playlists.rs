use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Playlist, PlaylistChanges};
use crate::error::ApiError;
use crate::filter::{PlaylistFilter, PlaylistQuery};
use crate::handlers::extract::{parse_id, JsonBody, QueryParams};
use crate::handlers::protected::require_account;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{self, Action};
use crate::state::AppState;
use crate::validation::{self, ValidationError, DESCRIPTION_MAX, TITLE_MAX};

/// Create/update body. Any `userId` sent by the client is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub track_ids: Option<Vec<Uuid>>,
}

impl PlaylistBody {
    /// Field rules, then a store lookup so every referenced track exists.
    async fn validate(self, state: &AppState) -> Result<PlaylistChanges, ApiError> {
        let title = self
            .title
            .map(|v| validation::bounded_text("Title", v, TITLE_MAX))
            .transpose()?;
        let description = self
            .description
            .map(|v| validation::bounded_text("Description", v, DESCRIPTION_MAX))
            .transpose()?;

        if let Some(track_ids) = &self.track_ids {
            validation::distinct_track_ids(track_ids)?;
            if let Some(missing) = state.store.missing_tracks(track_ids).await?.first() {
                return Err(ValidationError::UnknownTrack(*missing).into());
            }
        }

        Ok(PlaylistChanges {
            title,
            description,
            track_ids: self.track_ids,
        })
    }
}

/// GET /playlists - The caller's playlists, optionally filtered
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    QueryParams(query): QueryParams<PlaylistQuery>,
) -> ApiResult<Vec<Playlist>> {
    let filter = PlaylistFilter::try_from(query)?;
    let playlists = state.store.list_playlists(caller.id, &filter).await?;
    Ok(ApiResponse::success(playlists))
}

/// POST /playlists - Create a playlist owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    JsonBody(body): JsonBody<PlaylistBody>,
) -> ApiResult<Playlist> {
    require_account(&state, &caller).await?;
    let playlist = Playlist::new(caller.id, body.validate(&state).await?);
    state.store.insert_playlist(&playlist).await?;
    tracing::info!(playlist_id = %playlist.id, user_id = %caller.id, "created playlist");

    Ok(ApiResponse::created(playlist))
}

/// GET /playlists/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Playlist> {
    let id = parse_id(&id)?;
    let playlist = ownership::authorize(state.store.find_playlist(id).await?, caller.id, Action::View)?;
    Ok(ApiResponse::success(playlist))
}

/// PATCH /playlists/:id - Owner-only partial update
pub async fn patch(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PlaylistBody>,
) -> ApiResult<Playlist> {
    let id = parse_id(&id)?;
    let mut playlist = ownership::authorize(state.store.find_playlist(id).await?, caller.id, Action::Update)?;

    playlist.apply(body.validate(&state).await?);
    if !state.store.update_playlist(&playlist).await? {
        let current = state.store.find_playlist(id).await?;
        return Err(ownership::rejected_write(current, caller.id, Action::Update));
    }
    tracing::info!(playlist_id = %id, "updated playlist");

    Ok(ApiResponse::success(playlist))
}

/// DELETE /playlists/:id - Owner-only delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    ownership::authorize(state.store.find_playlist(id).await?, caller.id, Action::Delete)?;

    if !state.store.delete_playlist(id, caller.id).await? {
        let current = state.store.find_playlist(id).await?;
        return Err(ownership::rejected_write(current, caller.id, Action::Delete));
    }
    tracing::info!(playlist_id = %id, "deleted playlist");

    Ok(ApiResponse::no_content())
}
