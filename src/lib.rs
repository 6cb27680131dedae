pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod ownership;
pub mod state;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Builds the full router over the given state.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(user_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(public::register))
        .route("/users/login", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(me_routes())
        .merge(track_routes())
        .merge(playlist_routes())
        .route("/exports", get(protected::exports::get))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn me_routes() -> Router<AppState> {
    use protected::me;

    Router::new().route("/users/me", get(me::get).patch(me::patch).delete(me::delete))
}

fn track_routes() -> Router<AppState> {
    use protected::tracks;

    Router::new()
        .route("/tracks", get(tracks::list).post(tracks::create))
        .route(
            "/tracks/:id",
            get(tracks::get).patch(tracks::patch).delete(tracks::delete),
        )
}

fn playlist_routes() -> Router<AppState> {
    use protected::playlists;

    Router::new()
        .route("/playlists", get(playlists::list).post(playlists::create))
        .route(
            "/playlists/:id",
            get(playlists::get).patch(playlists::patch).delete(playlists::delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
}
