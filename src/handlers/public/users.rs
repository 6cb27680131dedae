use axum::extract::State;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, password};
use crate::database::models::{Gender, NewUser, User};
use crate::database::UniqueField;
use crate::error::ApiError;
use crate::handlers::extract::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation;

pub const REGISTER_FIELDS_REQUIRED: &str = "Username, email and password are required";
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

/// Treats absent and blank values the same way.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Optional profile fields given at registration.
fn validate_profile(
    phone_number: Option<String>,
    birth_date: Option<NaiveDate>,
    gender: Option<String>,
) -> Result<(Option<String>, Option<NaiveDate>, Option<Gender>), ApiError> {
    let phone_number = match present(phone_number) {
        Some(phone) => {
            validation::validate_phone_number(&phone)?;
            Some(phone.trim().to_string())
        }
        None => None,
    };
    if let Some(date) = birth_date {
        validation::validate_birth_date(date, Utc::now().date_naive())?;
    }
    let gender = present(gender).map(|g| g.parse::<Gender>()).transpose()?;

    Ok((phone_number, birth_date, gender))
}

/// POST /users/register - Create a new account
///
/// Username collisions are reported before email collisions.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<RegisteredUser> {
    let (Some(username), Some(email), Some(password)) = (
        present(payload.username),
        present(payload.email),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(REGISTER_FIELDS_REQUIRED));
    };

    let email = validation::normalize_email(&email);
    validation::validate_username(&username)?;
    validation::validate_email(&email)?;
    validation::validate_password(&password)?;
    let (phone_number, birth_date, gender) =
        validate_profile(payload.phone_number, payload.birth_date, payload.gender)?;

    if state.store.find_user_by_username(&username).await?.is_some() {
        return Err(ApiError::conflict(UniqueField::Username.conflict_message()));
    }
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict(UniqueField::Email.conflict_message()));
    }

    let password_hash = password::hash_password(password, state.bcrypt_cost()).await?;
    let user = User::new(
        NewUser {
            username,
            email,
            phone_number,
            birth_date,
            gender,
        },
        password_hash,
    );

    state.store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "registered user {}", user.username);

    Ok(ApiResponse::created(RegisteredUser {
        id: user.id,
        email: user.email,
    }))
}

/// POST /users/login - Exchange credentials for an access token
///
/// Unknown emails and wrong passwords produce the same response.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let (Some(email), Some(password)) = (present(payload.email), payload.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request(LOGIN_FIELDS_REQUIRED));
    };

    let email = validation::normalize_email(&email);
    let Some(user) = state.store.find_user_by_email(&email).await? else {
        tracing::debug!("login for unknown email");
        password::burn_verify(password, state.bcrypt_cost()).await?;
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !password::verify_password(password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let access_token = auth::issue(&user.identity(), state.jwt_secret(), state.token_ttl())?;
    tracing::info!(user_id = %user.id, "issued access token");

    Ok(ApiResponse::success(LoginResponse { access_token }))
}
