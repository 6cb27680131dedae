use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Playlist;
use crate::error::ApiError;
use crate::filter::PlaylistFilter;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub const EXPORT_FILENAME: &str = "playlists.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistExport {
    pub exported_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub playlists: Vec<Playlist>,
}

/// GET /exports - Download the caller's playlists as a JSON file
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let playlists = state.store.list_playlists(caller.id, &PlaylistFilter::default()).await?;
    tracing::info!(user_id = %caller.id, count = playlists.len(), "exported playlists");

    let export = PlaylistExport {
        exported_at: Utc::now(),
        user_id: caller.id,
        playlists,
    };

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILENAME}\""),
        )],
        Json(export),
    ))
}
