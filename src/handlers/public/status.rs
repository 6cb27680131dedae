use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "SoundShelf API",
        "version": version,
        "endpoints": {
            "users": "/users/register, /users/login (public); /users/me (protected)",
            "tracks": "/tracks[/:id] (protected)",
            "playlists": "/playlists[/:id] (protected)",
            "exports": "/exports (protected)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - Store liveness
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.store.kind();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": store,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": store,
                })),
            )
        }
    }
}
