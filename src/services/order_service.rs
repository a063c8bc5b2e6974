use crate::entities::{
    OrderStatus, UserRole, order_entity as orders, order_status_log_entity as order_status_logs,
    voucher_entity as vouchers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::admin_access::check_admin_access;
use crate::services::voucher_service::grant_order_bonuses;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

/// Statuses an admin (or the sweeper) may still cancel from.
const ADMIN_CANCELLABLE: [OrderStatus; 3] = [
    OrderStatus::AwaitingPayment,
    OrderStatus::AwaitingConfirmation,
    OrderStatus::Processed,
];

/// Moves `order` to `to` only if its status is still the one we read, then records the
/// transition. A concurrent writer that got there first makes this fail cleanly.
async fn transition<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
    to: OrderStatus,
    actor_id: i64,
) -> AppResult<orders::Model> {
    let now = Utc::now();
    let res = orders::Entity::update_many()
        .col_expr(
            orders::Column::Status,
            Expr::val(to).as_enum(Alias::new("order_status")),
        )
        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
        .filter(orders::Column::Id.eq(order.id))
        .filter(orders::Column::Status.eq(order.status))
        .exec(conn)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::ValidationError(
            "Status pesanan sudah berubah, silakan muat ulang".to_string(),
        ));
    }

    order_status_logs::ActiveModel {
        order_id: Set(order.id),
        from_status: Set(order.status),
        to_status: Set(to),
        actor_id: Set(actor_id),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(orders::Model {
        status: to,
        updated_at: now,
        ..order.clone()
    })
}

#[derive(Clone)]
pub struct OrderService {
    pool: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn cancel_order(&self, actor: AuthUser, order_id: i64) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;
        let order = orders::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pesanan tidak ditemukan".to_string()))?;

        match actor.role {
            UserRole::Customer => {
                if order.user_id != actor.id {
                    return Err(AppError::NotFound("Pesanan tidak ditemukan".to_string()));
                }
                if order.status != OrderStatus::AwaitingPayment {
                    return Err(AppError::ValidationError(
                        "Pesanan hanya dapat dibatalkan sebelum pembayaran".to_string(),
                    ));
                }
            }
            role => {
                check_admin_access(&txn, role, actor.id, order.store_id).await?;
                if !ADMIN_CANCELLABLE.contains(&order.status) {
                    return Err(AppError::ValidationError(format!(
                        "Pesanan berstatus {} tidak dapat dibatalkan",
                        order.status
                    )));
                }
            }
        }

        let cancelled = transition(&txn, &order, OrderStatus::Cancelled, actor.id).await?;

        // 释放订单占用的优惠券
        let released = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::UsedAt, Expr::value(Option::<DateTime<Utc>>::None))
            .col_expr(vouchers::Column::OrderId, Expr::value(Option::<i64>::None))
            .filter(vouchers::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        log::info!(
            "Order {order_id} cancelled by user {} (was {}, released {} vouchers)",
            actor.id,
            order.status,
            released.rows_affected
        );
        Ok(OrderResponse::from(cancelled))
    }

    pub async fn confirm_shipment(
        &self,
        actor: AuthUser,
        order_id: i64,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;
        let order = orders::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pesanan tidak ditemukan".to_string()))?;

        if order.user_id != actor.id && !actor.is_super_admin() {
            return Err(AppError::Forbidden(
                "Anda tidak dapat mengonfirmasi pesanan ini".to_string(),
            ));
        }
        if order.status != OrderStatus::Shipped {
            return Err(AppError::ValidationError(
                "Hanya pesanan yang sudah dikirim yang dapat dikonfirmasi".to_string(),
            ));
        }

        let confirmed = transition(&txn, &order, OrderStatus::Confirmed, actor.id).await?;
        let granted = grant_order_bonuses(&txn, &confirmed).await?;

        txn.commit().await?;
        log::info!(
            "Order {order_id} confirmed by user {} ({granted} bonus vouchers)",
            actor.id
        );
        Ok(OrderResponse::from(confirmed))
    }

    pub async fn find_expired_pending_orders(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>> {
        let ids = orders::Entity::find()
            .select_only()
            .column(orders::Column::Id)
            .filter(orders::Column::Status.eq(OrderStatus::AwaitingPayment))
            .filter(orders::Column::CreatedAt.lt(cutoff))
            .order_by_asc(orders::Column::Id)
            .into_tuple::<i64>()
            .all(self.pool.as_ref())
            .await?;
        Ok(ids)
    }

    pub async fn find_stale_shipped_orders(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>> {
        let ids = orders::Entity::find()
            .select_only()
            .column(orders::Column::Id)
            .filter(orders::Column::Status.eq(OrderStatus::Shipped))
            .filter(orders::Column::UpdatedAt.lt(cutoff))
            .order_by_asc(orders::Column::Id)
            .into_tuple::<i64>()
            .all(self.pool.as_ref())
            .await?;
        Ok(ids)
    }

    pub async fn list_user_orders(
        &self,
        user_id: i64,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut select = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        if let Some(status) = query.status {
            select = select.filter(orders::Column::Status.eq(status));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(orders::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(OrderResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn order(status: OrderStatus) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 11,
            user_id: 9,
            store_id: 4,
            status,
            subtotal: 100_000,
            shipping_cost: 20_000,
            total: 120_000,
            transaction_voucher_id: Some(1),
            delivery_voucher_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn log_row(from: OrderStatus, to: OrderStatus) -> order_status_logs::Model {
        order_status_logs::Model {
            id: 1,
            order_id: 11,
            from_status: from,
            to_status: to,
            actor_id: 9,
            created_at: Utc::now(),
        }
    }

    fn customer(id: i64) -> AuthUser {
        AuthUser {
            id,
            role: UserRole::Customer,
        }
    }

    #[tokio::test]
    async fn test_customer_cancels_own_pending_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::AwaitingPayment)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![log_row(
                OrderStatus::AwaitingPayment,
                OrderStatus::Cancelled,
            )]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));

        let res = svc.cancel_order(customer(9), 11).await.unwrap();
        assert_eq!(res.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_customer_cannot_cancel_processed_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::Processed)]])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));
        assert!(matches!(
            svc.cancel_order(customer(9), 11).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_customer_cannot_cancel_someone_elses_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::AwaitingPayment)]])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));
        assert!(matches!(
            svc.cancel_order(customer(10), 11).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_loses_race() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::AwaitingPayment)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));
        let admin = AuthUser {
            id: 1,
            role: UserRole::SuperAdmin,
        };
        assert!(matches!(
            svc.cancel_order(admin, 11).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_super_admin_cannot_cancel_shipped_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::Shipped)]])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));
        let admin = AuthUser {
            id: 1,
            role: UserRole::SuperAdmin,
        };
        assert!(svc.cancel_order(admin, 11).await.is_err());
    }

    #[tokio::test]
    async fn test_confirm_requires_shipped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::Processed)]])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));
        assert!(matches!(
            svc.confirm_shipment(customer(9), 11).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_confirm_by_stranger_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(OrderStatus::Shipped)]])
            .into_connection();
        let svc = OrderService::new(Arc::new(db));
        assert!(matches!(
            svc.confirm_shipment(customer(10), 11).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
