//! Leave API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_contracts::leaves::ApplyLeaveRequest;
use hr_contracts::query::ListParams;
use hr_contracts::review::ReviewRequest;
use hr_core::traits::Id;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, JsonBody, QueryParams};

/// POST /api/v1/leaves
pub async fn apply_leave(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<ApplyLeaveRequest>,
) -> ApiResult<impl IntoResponse> {
    let leave = state.leaves.apply(&user, request).await?;
    Ok((StatusCode::CREATED, Json(leave)))
}

/// GET /api/v1/leaves
pub async fn list_leaves(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = state.leaves.list(&user, params).await?;
    Ok(Json(page))
}

/// PUT /api/v1/leaves/:id/review
pub async fn review_leave(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    JsonBody(request): JsonBody<ReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    let leave = state.leaves.review(&user, id, request).await?;
    Ok(Json(leave))
}
