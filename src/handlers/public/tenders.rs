// Public tender reads: list, search, filter, show

use axum::{
    extract::{Query, State},
    Json,
};

use crate::api::{ApiPath, AppState};
use crate::database::TenderRepository;
use crate::error::ApiResult;
use crate::filter::{Filter, QueryMode, RawParams, TenderQuery};
use crate::models::Tender;

/// GET /api/tenders
pub async fn list_tenders(State(state): State<AppState>) -> ApiResult<Json<Vec<Tender>>> {
    let filter = Filter::new(&TenderQuery::default(), QueryMode::Search);
    let tenders = TenderRepository::new(state.pool.clone()).select_any(filter).await?;
    Ok(Json(tenders))
}

/// GET /api/tenders/search - free text plus optional refinements
pub async fn search_tenders(
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> ApiResult<Json<Vec<Tender>>> {
    let query = TenderQuery::from_search_params(&params);
    let filter = Filter::new(&query, QueryMode::Search);
    let tenders = TenderRepository::new(state.pool.clone()).select_any(filter).await?;
    tracing::debug!("search matched {} tenders", tenders.len());
    Ok(Json(tenders))
}

/// GET /api/tenders/filter - category, status and budget only
pub async fn filter_tenders(
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> ApiResult<Json<Vec<Tender>>> {
    let query = TenderQuery::from_filter_params(&params);
    let filter = Filter::new(&query, QueryMode::Filter);
    let tenders = TenderRepository::new(state.pool.clone()).select_any(filter).await?;
    Ok(Json(tenders))
}

/// GET /api/tenders/:id
pub async fn get_tender(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<Json<Tender>> {
    let tender = TenderRepository::new(state.pool.clone()).select_404(id).await?;
    Ok(Json(tender))
}
