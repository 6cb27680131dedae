// handlers/protected/mod.rs - Protected handlers (bearer JWT required)
//
// Every handler here runs behind `jwt_auth_middleware` and receives the caller
// as `Extension<AuthUser>`. Track and playlist handlers resolve the target
// through `ownership::authorize` before reading or writing it.

pub mod exports;
pub mod me;
pub mod playlists;
pub mod tracks;

use crate::error::ApiError;
use crate::middleware::auth::TOKEN_INVALID_MESSAGE;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Rejects a still-valid token whose account has since been deleted.
///
/// Run before creating anything owned by the caller.
pub(crate) async fn require_account(state: &AppState, caller: &AuthUser) -> Result<(), ApiError> {
    if state.store.find_user(caller.id).await?.is_none() {
        tracing::debug!(user_id = %caller.id, "token outlived its account");
        return Err(ApiError::unauthorized(TOKEN_INVALID_MESSAGE));
    }
    Ok(())
}
