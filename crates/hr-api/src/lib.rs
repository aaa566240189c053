//! # hr-api
//!
//! REST API v1 handlers for the HR service.
//!
//! Handlers are thin: they extract the caller and the request, hand both to a
//! service from `hr-services`, and turn the result (or the `HrError`) into a
//! JSON response.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
