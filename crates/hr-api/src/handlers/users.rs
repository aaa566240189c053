//! User profile and notification handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use hr_contracts::profile::UpdateProfileRequest;
use hr_core::traits::Id;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, JsonBody};

/// GET /api/v1/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let profile = state.profile.me(&user).await?;
    Ok(Json(profile))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.profile.get(&user, id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.profile.update(&user, id, request).await?;
    Ok(Json(profile))
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let notifications = state.profile.notifications(&user).await?;
    Ok(Json(notifications))
}
