//! Attendance API handlers

use axum::{extract::State, response::IntoResponse, Json};
use hr_contracts::attendance::RecordAttendanceRequest;
use hr_contracts::query::ListParams;

use super::upserted;
use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, JsonBody, QueryParams};

/// POST /api/v1/attendance
pub async fn record_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<RecordAttendanceRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state.attendance.record(&user, request).await?;
    Ok(upserted(result))
}

/// GET /api/v1/attendance
pub async fn attendance_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let report = state.attendance.report(&user, params).await?;
    Ok(Json(report))
}
