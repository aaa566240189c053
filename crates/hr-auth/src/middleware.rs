//! Request authentication
//!
//! Turns the `Authorization` header into a [`CurrentUser`]. Anything other
//! than a valid bearer token is a 401.

use std::sync::Arc;

use hr_core::error::HrError;
use thiserror::Error;

use crate::jwt::{extract_bearer_token, JwtError, JwtService};
use crate::permissions::CurrentUser;

/// Authentication errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
}

impl From<AuthError> for HrError {
    fn from(err: AuthError) -> Self {
        HrError::unauthorized(err.to_string())
    }
}

/// Request headers relevant for authentication
#[derive(Debug, Default)]
pub struct RequestHeaders {
    pub authorization: Option<String>,
}

impl RequestHeaders {
    /// Create from a list of header key-value pairs
    pub fn from_pairs(pairs: &[(impl AsRef<str>, impl AsRef<str>)]) -> Self {
        let mut headers = Self::default();
        for (name, value) in pairs {
            if name.as_ref().eq_ignore_ascii_case("authorization") {
                headers.authorization = Some(value.as_ref().to_string());
            }
        }
        headers
    }
}

/// Validates bearer tokens against the shared [`JwtService`]
#[derive(Clone)]
pub struct Authenticator {
    jwt_service: Arc<JwtService>,
}

impl Authenticator {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }

    pub fn authenticate(&self, headers: &RequestHeaders) -> Result<CurrentUser, AuthError> {
        let header = headers.authorization.as_deref().ok_or(AuthError::Required)?;
        let token = extract_bearer_token(header).ok_or(AuthError::Required)?;

        let claims = self.jwt_service.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            match e {
                JwtError::Expired => AuthError::TokenExpired,
                _ => AuthError::InvalidCredentials,
            }
        })?;
        let user_id = claims.user_id().map_err(|_| AuthError::InvalidCredentials)?;

        Ok(CurrentUser::new(user_id, claims.role, claims.store_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_models::Role;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(JwtService::new(SECRET)))
    }

    #[test]
    fn test_jwt_authentication() {
        let token = JwtService::new(SECRET)
            .create_token(5, Role::HrCoordinator, Some(2), 3600)
            .unwrap();
        let headers = RequestHeaders::from_pairs(&[("Authorization", format!("Bearer {}", token))]);

        let user = authenticator().authenticate(&headers).unwrap();
        assert_eq!(user, CurrentUser::new(5, Role::HrCoordinator, Some(2)));
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        assert_eq!(
            authenticator().authenticate(&RequestHeaders::default()),
            Err(AuthError::Required)
        );
        let basic = RequestHeaders::from_pairs(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(authenticator().authenticate(&basic), Err(AuthError::Required));

        let garbage = RequestHeaders::from_pairs(&[("authorization", "Bearer not.a.jwt")]);
        assert_eq!(
            authenticator().authenticate(&garbage),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_expired_token() {
        let token = JwtService::new(SECRET)
            .create_token(5, Role::Employee, None, -600)
            .unwrap();
        let headers = RequestHeaders::from_pairs(&[("authorization", format!("Bearer {}", token))]);
        assert_eq!(authenticator().authenticate(&headers), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_maps_to_unauthorized() {
        let err: HrError = AuthError::Required.into();
        assert_eq!(err.status_code(), 401);
    }
}
