// POST /api/auth/register, POST /api/auth/login

use axum::{extract::State, http::StatusCode, Json};

use crate::api::{format, ApiJson, AppState};
use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config;
use crate::database::models::UserRow;
use crate::database::UserRepository;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthenticatedUser, LoginRequest, RegisterRequest};
use crate::types::Role;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Self-registration always creates a plain `user`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthenticatedUser>)> {
    let body = body.normalized(config::config().security.min_password_length)?;
    let users = UserRepository::new(state.pool.clone());

    if users.find_by_email(&body.email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash = hash_password(&body.password)?;
    let row = users
        .create(&body.email, &password_hash, &body.full_name, Role::User)
        .await?;
    tracing::info!("registered user {} <{}>", row.id, row.email);

    Ok(format::created(session_for(&row)?))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthenticatedUser>> {
    let email = body.normalized_email();
    let row = UserRepository::new(state.pool.clone())
        .find_by_email(&email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("login for unknown email <{}>", email);
            ApiError::unauthorized(INVALID_CREDENTIALS)
        })?;

    if !verify_password(&body.password, &row.password_hash)? {
        tracing::warn!("wrong password for user {}", row.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    Ok(Json(session_for(&row)?))
}

fn session_for(row: &UserRow) -> ApiResult<AuthenticatedUser> {
    let profile = row.to_profile()?;
    let token = generate_jwt(&Claims::new(profile.id, profile.role))?;
    Ok(AuthenticatedUser::new(profile, token))
}
