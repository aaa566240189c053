//! Axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use hr_auth::{Authenticator, CurrentUser, RequestHeaders};
use hr_core::HrError;
use hr_services::{
    AttendanceService, ExpenseService, LeaveService, OvertimeService, PayslipService,
    ProfileService, Repositories, SettingsService,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub expenses: ExpenseService,
    pub payslips: PayslipService,
    pub attendance: AttendanceService,
    pub leaves: LeaveService,
    pub overtime: OvertimeService,
    pub settings: SettingsService,
    pub profile: ProfileService,
}

impl AppState {
    pub fn new(repos: Repositories, authenticator: Authenticator) -> Self {
        Self {
            authenticator,
            expenses: ExpenseService::new(repos.clone()),
            payslips: PayslipService::new(repos.clone()),
            attendance: AttendanceService::new(repos.clone()),
            leaves: LeaveService::new(repos.clone()),
            overtime: OvertimeService::new(repos.clone()),
            settings: SettingsService::new(repos.clone()),
            profile: ProfileService::new(repos),
        }
    }
}

/// Authenticated user extractor
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let headers = RequestHeaders {
            authorization: parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        };

        let user = app_state
            .authenticator
            .authenticate(&headers)
            .map_err(HrError::from)?;
        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// JSON body whose decoding failures are reported like validation errors
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Query string with the same error shape as [`JsonBody`]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(QueryParams(value))
    }
}
