use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Identity};
use crate::error::ApiError;
use crate::state::AppState;

pub const TOKEN_MISSING_MESSAGE: &str = "User is not authorized or token is missing";
pub const TOKEN_INVALID_MESSAGE: &str = "User is not authorized";

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
        }
    }
}

/// JWT authentication middleware that validates tokens and attaches the caller
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("rejected request without bearer token");
        ApiError::unauthorized(TOKEN_MISSING_MESSAGE)
    })?;

    let identity = auth::verify(token, state.jwt_secret()).map_err(|e| {
        tracing::debug!("rejected bearer token: {}", e);
        ApiError::unauthorized(TOKEN_INVALID_MESSAGE)
    })?;

    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::Duration;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), AppConfig::development())
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(|Extension(user): Extension<AuthUser>| async move { user.username }))
            .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
            .with_state(state)
    }

    async fn call(state: AppState, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let resp = app(state).oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn token(state: &AppState, ttl: Duration) -> String {
        let identity = Identity {
            id: Uuid::new_v4(),
            username: "dj_shadow".to_string(),
            email: "shadow@example.com".to_string(),
        };
        auth::issue(&identity, state.jwt_secret(), ttl).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (status, body) = call(state(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(TOKEN_MISSING_MESSAGE));
    }

    #[tokio::test]
    async fn wrong_scheme_is_treated_as_missing() {
        let (status, body) = call(state(), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(TOKEN_MISSING_MESSAGE));

        let (_, body) = call(state(), Some("Bearer   ")).await;
        assert!(body.contains(TOKEN_MISSING_MESSAGE));
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let (status, body) = call(state(), Some("Bearer not-a-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, format!("{{\"message\":\"{}\"}}", TOKEN_INVALID_MESSAGE));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let state = state();
        let expired = token(&state, Duration::seconds(-30));
        let (status, body) = call(state, Some(&format!("Bearer {expired}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(TOKEN_INVALID_MESSAGE));
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let state = state();
        let good = token(&state, Duration::minutes(10));
        let (status, body) = call(state, Some(&format!("Bearer {good}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "dj_shadow");
    }
}
