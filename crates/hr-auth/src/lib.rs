//! # hr-auth
//!
//! Authentication and authorization for the HR service.
//!
//! Sessions are issued by an external identity provider as signed JWTs that
//! carry the user id, role and store. This crate validates them and answers
//! one question for every handler: may this user perform this action on this
//! scope?

pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, JwtError, JwtService};
pub use middleware::{AuthError, Authenticator, RequestHeaders};
pub use permissions::{authorize, Action, CurrentUser, Scope};
