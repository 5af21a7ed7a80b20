//! Session handling against the external auth service

use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod logging;
pub mod session;

pub use session::{AuthError, AuthSessionManager, SessionCheck};

/// Account creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}
