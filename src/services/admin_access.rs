use crate::entities::{UserRole, store_admin_entity as store_admins};
use crate::error::{AppError, AppResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// Super admins manage every store. Store admins must be registered for `store_id`.
/// Customers never pass.
pub async fn check_admin_access<C: ConnectionTrait>(
    conn: &C,
    role: UserRole,
    actor_id: i64,
    store_id: i64,
) -> AppResult<()> {
    match role {
        UserRole::SuperAdmin => Ok(()),
        UserRole::StoreAdmin => {
            let registered = store_admins::Entity::find()
                .filter(store_admins::Column::StoreId.eq(store_id))
                .filter(store_admins::Column::UserId.eq(actor_id))
                .one(conn)
                .await?;
            if registered.is_none() {
                return Err(AppError::Unauthorized(
                    "Anda bukan admin toko ini".to_string(),
                ));
            }
            Ok(())
        }
        UserRole::Customer => Err(AppError::Unauthorized(
            "Hanya admin yang dapat mengakses fitur ini".to_string(),
        )),
    }
}
