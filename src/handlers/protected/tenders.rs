// POST /api/tenders, PUT /api/tenders/:id, DELETE /api/tenders/:id

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::api::{format, ApiJson, ApiPath, AppState};
use crate::auth::ensure_self_or_admin;
use crate::database::TenderRepository;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::{Tender, TenderInput};
use crate::types::SuccessResponse;

/// The acting user becomes the tender's owner
pub async fn create_tender(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<TenderInput>,
) -> ApiResult<(StatusCode, Json<Tender>)> {
    let draft = body.into_draft()?;
    let tender = TenderRepository::new(state.pool.clone()).create(&draft, auth.id).await?;
    tracing::info!("user {} created tender {}", auth.id, tender.id);
    Ok(format::created(tender))
}

/// Partial update; the merged tender must still validate
pub async fn update_tender(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<TenderInput>,
) -> ApiResult<Json<Tender>> {
    let tenders = TenderRepository::new(state.pool.clone());
    let existing = tenders.select_404(id).await?;
    ensure_self_or_admin(&auth.actor(), existing.created_by, "update this tender")?;

    let draft = TenderInput::from(&existing).overlay(&body).into_draft()?;
    let updated = tenders.update(id, &draft).await?;
    Ok(Json(updated))
}

/// Removes the tender together with all of its subscriptions
pub async fn delete_tender(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<SuccessResponse>> {
    let tenders = TenderRepository::new(state.pool.clone());
    let existing = tenders.select_404(id).await?;
    ensure_self_or_admin(&auth.actor(), existing.created_by, "delete this tender")?;

    let removed = tenders.delete_with_subscriptions(id).await?;
    tracing::info!("user {} deleted tender {} ({} subscriptions removed)", auth.id, id, removed);
    Ok(format::success())
}
