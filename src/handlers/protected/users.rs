// Profile, password and subscription list for one user

use axum::{extract::State, Extension, Json};

use crate::api::{format, ApiJson, ApiPath, AppState};
use crate::auth::{ensure_self_or_admin, hash_password, verify_password};
use crate::config;
use crate::database::{SubscriptionRepository, TenderRepository, UserRepository};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::{ChangePasswordRequest, Profile, ProfileUpdate, SubscribedTender};
use crate::types::SuccessResponse;

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<Profile>> {
    ensure_self_or_admin(&auth.actor(), Some(id), "view this profile")?;
    let row = UserRepository::new(state.pool.clone()).select_404(id).await?;
    Ok(Json(row.to_profile()?))
}

/// PUT /api/users/:id - email and password are not changed here
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    ensure_self_or_admin(&auth.actor(), Some(id), "update this profile")?;
    let users = UserRepository::new(state.pool.clone());

    let mut profile = users.select_404(id).await?.to_profile()?;
    body.apply(&mut profile, auth.is_admin())?;

    let row = users.update_profile(id, &profile.full_name, profile.role).await?;
    Ok(Json(row.to_profile()?))
}

/// PUT /api/users/:id/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    ensure_self_or_admin(&auth.actor(), Some(id), "change this password")?;
    body.validate(config::config().security.min_password_length)?;

    let users = UserRepository::new(state.pool.clone());
    let row = users.select_404(id).await?;
    if !verify_password(&body.current_password, &row.password_hash)? {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    users.update_password(id, &hash_password(&body.new_password)?).await?;
    tracing::info!("user {} changed password of user {}", auth.id, id);
    Ok(format::success())
}

/// GET /api/users/:id/subscriptions
pub async fn user_subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<Vec<SubscribedTender>>> {
    ensure_self_or_admin(&auth.actor(), Some(id), "view these subscriptions")?;

    let subscriptions = SubscriptionRepository::new(state.pool.clone()).list_for_user(id).await?;
    let tender_ids: Vec<i32> = subscriptions.iter().map(|s| s.tender_id).collect();
    let tenders = TenderRepository::new(state.pool.clone()).find_by_ids(&tender_ids).await?;

    Ok(Json(format::subscriptions_with_tenders(subscriptions, &tenders)))
}
