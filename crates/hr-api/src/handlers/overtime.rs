//! Overtime API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_contracts::overtime::OvertimeRequestBody;
use hr_contracts::query::ListParams;
use hr_contracts::review::ReviewRequest;
use hr_core::traits::Id;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, JsonBody, QueryParams};

/// POST /api/v1/overtime
pub async fn request_overtime(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<OvertimeRequestBody>,
) -> ApiResult<impl IntoResponse> {
    let overtime = state.overtime.request(&user, request).await?;
    Ok((StatusCode::CREATED, Json(overtime)))
}

/// GET /api/v1/overtime
pub async fn list_overtime(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = state.overtime.list(&user, params).await?;
    Ok(Json(page))
}

/// PUT /api/v1/overtime/:id/review
pub async fn review_overtime(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    JsonBody(request): JsonBody<ReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    let overtime = state.overtime.review(&user, id, request).await?;
    Ok(Json(overtime))
}
