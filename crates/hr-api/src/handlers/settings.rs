//! Store settings API handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use hr_contracts::calendar::CalendarRequest;
use hr_contracts::holidays::{HolidayDeleteParams, HolidaySettingsRequest};
use hr_contracts::query::ListParams;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, JsonBody, QueryParams};

/// GET /api/v1/settings/holidays?storeName=
pub async fn list_holidays(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let holidays = state.settings.holidays(&user, params).await?;
    Ok(Json(holidays))
}

/// PUT /api/v1/settings/holidays
pub async fn save_holidays(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<HolidaySettingsRequest>,
) -> ApiResult<impl IntoResponse> {
    let holidays = state.settings.save_holidays(&user, request).await?;
    Ok(Json(holidays))
}

/// DELETE /api/v1/settings/holidays?storeName=&date=
pub async fn delete_holiday(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<HolidayDeleteParams>,
) -> ApiResult<StatusCode> {
    state.settings.delete_holiday(&user, params).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/settings/calendar?storeName=
pub async fn get_calendar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let calendar = state.settings.calendar(&user, params).await?;
    Ok(Json(calendar))
}

/// POST /api/v1/settings/calendar
pub async fn create_calendar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<CalendarRequest>,
) -> ApiResult<impl IntoResponse> {
    let calendar = state.settings.create_calendar(&user, request).await?;
    Ok((StatusCode::CREATED, Json(calendar)))
}

/// PUT /api/v1/settings/calendar
pub async fn update_calendar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<CalendarRequest>,
) -> ApiResult<impl IntoResponse> {
    let calendar = state.settings.update_calendar(&user, request).await?;
    Ok(Json(calendar))
}
