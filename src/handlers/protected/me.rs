use axum::{extract::State, Extension};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::password;
use crate::database::models::{Gender, PublicUser};
use crate::database::UniqueField;
use crate::error::ApiError;
use crate::handlers::extract::{nullable, JsonBody};
use crate::handlers::public::users::present;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation;

const USER_NOT_FOUND: &str = "User not found";

/// Absent keys leave a field unchanged. For the optional profile fields an
/// explicit `null` or empty string clears the stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: Option<Option<String>>,
}

/// GET /users/me - The caller's own account
pub async fn get(State(state): State<AppState>, Extension(caller): Extension<AuthUser>) -> ApiResult<PublicUser> {
    let user = state
        .store
        .find_user(caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    Ok(ApiResponse::success(user.to_public()))
}

/// PATCH /users/me - Update the caller's own account
pub async fn patch(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    JsonBody(payload): JsonBody<UpdateMeRequest>,
) -> ApiResult<PublicUser> {
    let mut user = state
        .store
        .find_user(caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    if let Some(username) = payload.username {
        validation::validate_username(&username)?;
        if username != user.username {
            if state.store.find_user_by_username(&username).await?.is_some() {
                return Err(ApiError::conflict(UniqueField::Username.conflict_message()));
            }
            user.username = username;
        }
    }

    if let Some(email) = payload.email {
        let email = validation::normalize_email(&email);
        validation::validate_email(&email)?;
        if email != user.email {
            if state.store.find_user_by_email(&email).await?.is_some() {
                return Err(ApiError::conflict(UniqueField::Email.conflict_message()));
            }
            user.email = email;
        }
    }

    if let Some(phone_number) = payload.phone_number {
        user.phone_number = match present(phone_number) {
            Some(phone) => {
                validation::validate_phone_number(&phone)?;
                Some(phone.trim().to_string())
            }
            None => None,
        };
    }
    if let Some(birth_date) = payload.birth_date {
        if let Some(date) = birth_date {
            validation::validate_birth_date(date, Utc::now().date_naive())?;
        }
        user.birth_date = birth_date;
    }
    if let Some(gender) = payload.gender {
        user.gender = present(gender).map(|g| g.parse::<Gender>()).transpose()?;
    }

    if let Some(new_password) = payload.password {
        validation::validate_password(&new_password)?;
        user.password_hash = password::hash_password(new_password, state.bcrypt_cost()).await?;
    }

    user.updated_at = Utc::now();
    if !state.store.update_user(&user).await? {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }
    tracing::info!(user_id = %user.id, "updated account");

    Ok(ApiResponse::success(user.to_public()))
}

/// DELETE /users/me - Remove the caller's account and everything it owns
pub async fn delete(State(state): State<AppState>, Extension(caller): Extension<AuthUser>) -> ApiResult<()> {
    if !state.store.delete_user(caller.id).await? {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }
    tracing::info!(user_id = %caller.id, "deleted account");

    Ok(ApiResponse::no_content())
}
