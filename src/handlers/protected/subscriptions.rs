// Subscribe / unsubscribe / check, all gated on the subscribing user

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::api::{format, ApiPath, AppState, OptionalJson};
use crate::auth::ensure_self_or_admin;
use crate::database::{DatabaseError, SubscriptionRepository, TenderRepository, UserRepository};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::{Subscription, SubscriptionRequest};
use crate::types::SuccessResponse;

/// POST /api/tenders/:id/subscribe
///
/// `userId` in the body defaults to the caller. Checks run in order:
/// tender exists, caller may act for that user, user exists, not yet subscribed.
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(tender_id): ApiPath<i32>,
    OptionalJson(body): OptionalJson<SubscriptionRequest>,
) -> ApiResult<(StatusCode, Json<Subscription>)> {
    TenderRepository::new(state.pool.clone()).select_404(tender_id).await?;

    let user_id = body.user_id.unwrap_or(auth.id);
    ensure_self_or_admin(&auth.actor(), Some(user_id), "subscribe this user")?;
    UserRepository::new(state.pool.clone()).select_404(user_id).await?;

    let subscriptions = SubscriptionRepository::new(state.pool.clone());
    if subscriptions.find(tender_id, user_id).await?.is_some() {
        return Err(ApiError::conflict("User already subscribed to this tender"));
    }

    let subscription = match subscriptions.create(tender_id, user_id).await {
        Ok(subscription) => subscription,
        // lost a race against a concurrent subscribe for the same pair
        Err(DatabaseError::Sqlx(sqlx::Error::Database(e))) if e.code().as_deref() == Some("23505") => {
            return Err(ApiError::conflict("User already subscribed to this tender"));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(format::created(subscription))
}

/// DELETE /api/tenders/:id/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(tender_id): ApiPath<i32>,
    OptionalJson(body): OptionalJson<SubscriptionRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let user_id = body.user_id.unwrap_or(auth.id);
    ensure_self_or_admin(&auth.actor(), Some(user_id), "unsubscribe this user")?;

    let deleted = SubscriptionRepository::new(state.pool.clone())
        .delete(tender_id, user_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Subscription not found"));
    }
    Ok(format::success())
}

/// GET /api/tenders/:id/subscriptions/:user_id - plain `true` / `false`
pub async fn is_subscribed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath((tender_id, user_id)): ApiPath<(i32, i32)>,
) -> ApiResult<Json<bool>> {
    ensure_self_or_admin(&auth.actor(), Some(user_id), "view these subscriptions")?;
    let found = SubscriptionRepository::new(state.pool.clone())
        .find(tender_id, user_id)
        .await?
        .is_some();
    Ok(Json(found))
}
