pub mod checkout;
pub mod order;
pub mod product_promotion;
pub mod promotion;
pub mod sweep;
pub mod voucher;

pub use checkout::checkout_config;
pub use order::order_config;
pub use product_promotion::product_promotion_config;
pub use promotion::promotion_config;
pub use sweep::sweep_config;
pub use voucher::voucher_config;

use crate::error::AppError;
use crate::models::AuthUser;
use actix_web::{HttpMessage, HttpRequest};

/// Caller placed into the request by `AuthMiddleware`.
fn current_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Silakan login terlebih dahulu".to_string()))
}

fn require_admin(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let user = current_user(req)?;
    if !user.role.is_admin() {
        return Err(AppError::Unauthorized(
            "Hanya admin yang dapat mengakses fitur ini".to_string(),
        ));
    }
    Ok(user)
}

fn require_super_admin(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let user = current_user(req)?;
    if !user.is_super_admin() {
        return Err(AppError::Unauthorized(
            "Hanya super admin yang dapat mengakses fitur ini".to_string(),
        ));
    }
    Ok(user)
}
