use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;

use crate::database::models::{Track, TrackChanges};
use crate::error::ApiError;
use crate::filter::{TrackFilter, TrackQuery};
use crate::handlers::extract::{parse_id, JsonBody, QueryParams};
use crate::handlers::protected::require_account;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{self, Action};
use crate::state::AppState;
use crate::validation::{self, DESCRIPTION_MAX, GENRE_MAX, TITLE_MAX};

/// Create/update body. Any `userId` sent by the client is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TrackBody {
    fn validate(self) -> Result<TrackChanges, ApiError> {
        Ok(TrackChanges {
            title: self
                .title
                .map(|v| validation::bounded_text("Title", v, TITLE_MAX))
                .transpose()?,
            description: self
                .description
                .map(|v| validation::bounded_text("Description", v, DESCRIPTION_MAX))
                .transpose()?,
            genre: self
                .genre
                .map(|v| validation::bounded_text("Genre", v, GENRE_MAX))
                .transpose()?,
            tags: self.tags.map(validation::tag_set).transpose()?,
        })
    }
}

/// GET /tracks - The caller's tracks, optionally filtered
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    QueryParams(query): QueryParams<TrackQuery>,
) -> ApiResult<Vec<Track>> {
    let filter = TrackFilter::try_from(query)?;
    let tracks = state.store.list_tracks(caller.id, &filter).await?;
    Ok(ApiResponse::success(tracks))
}

/// POST /tracks - Create a track owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    JsonBody(body): JsonBody<TrackBody>,
) -> ApiResult<Track> {
    require_account(&state, &caller).await?;
    let track = Track::new(caller.id, body.validate()?);
    state.store.insert_track(&track).await?;
    tracing::info!(track_id = %track.id, user_id = %caller.id, "created track");

    Ok(ApiResponse::created(track))
}

/// GET /tracks/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Track> {
    let id = parse_id(&id)?;
    let track = ownership::authorize(state.store.find_track(id).await?, caller.id, Action::View)?;
    Ok(ApiResponse::success(track))
}

/// PATCH /tracks/:id - Owner-only partial update
pub async fn patch(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<TrackBody>,
) -> ApiResult<Track> {
    let id = parse_id(&id)?;
    let mut track = ownership::authorize(state.store.find_track(id).await?, caller.id, Action::Update)?;

    track.apply(body.validate()?);
    if !state.store.update_track(&track).await? {
        let current = state.store.find_track(id).await?;
        return Err(ownership::rejected_write(current, caller.id, Action::Update));
    }
    tracing::info!(track_id = %id, "updated track");

    Ok(ApiResponse::success(track))
}

/// DELETE /tracks/:id - Owner-only delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    ownership::authorize(state.store.find_track(id).await?, caller.id, Action::Delete)?;

    if !state.store.delete_track(id, caller.id).await? {
        let current = state.store.find_track(id).await?;
        return Err(ownership::rejected_write(current, caller.id, Action::Delete));
    }
    tracing::info!(track_id = %id, "deleted track");

    Ok(ApiResponse::no_content())
}
