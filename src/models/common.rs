use crate::entities::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{ message, error }` failure envelope, as produced by `AppError`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub message: String,
    pub error: String,
}

/// Caller identity placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}
