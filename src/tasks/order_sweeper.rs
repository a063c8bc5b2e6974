use crate::config::SweeperConfig;
use crate::entities::{UserRole, user_entity as users};
use crate::error::AppResult;
use crate::models::AuthUser;
use crate::services::OrderService;
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::future::Future;
use utoipa::ToSchema;

/// Outcome of one pass over a batch of orders.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepReport {
    pub succeeded: Vec<i64>,
    pub failed: Vec<SweepFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepFailure {
    pub order_id: i64,
    pub error: String,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    fn log(&self, job: &str) {
        for f in &self.failed {
            log::warn!("{job}: order {} failed: {}", f.order_id, f.error);
        }
        if self.is_empty() {
            log::debug!("{job}: nothing to do");
        } else {
            log::info!(
                "{job}: {} succeeded, {} failed",
                self.succeeded.len(),
                self.failed.len()
            );
        }
    }
}

/// Runs `op` over every id. A failing order is recorded and the batch carries on.
pub async fn sweep<F, Fut, T>(ids: Vec<i64>, mut op: F) -> SweepReport
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut report = SweepReport::default();
    for id in ids {
        match op(id).await {
            Ok(_) => report.succeeded.push(id),
            Err(e) => report.failed.push(SweepFailure {
                order_id: id,
                error: e.to_string(),
            }),
        }
    }
    report
}

/// Picks the identity sweeper transitions are recorded under: the configured id, or else
/// the first active super admin.
pub async fn resolve_system_actor(
    pool: &DatabaseConnection,
    config: &SweeperConfig,
) -> AppResult<Option<AuthUser>> {
    if let Some(id) = config.system_actor_id {
        return Ok(Some(AuthUser {
            id,
            role: UserRole::SuperAdmin,
        }));
    }

    let user = users::Entity::find()
        .filter(users::Column::Role.eq(UserRole::SuperAdmin))
        .filter(users::Column::IsActive.eq(true))
        .order_by_asc(users::Column::Id)
        .one(pool)
        .await?;

    Ok(user.map(|u| AuthUser {
        id: u.id,
        role: u.role,
    }))
}

#[derive(Clone)]
pub struct OrderSweeper {
    order_service: OrderService,
    actor: AuthUser,
    config: SweeperConfig,
}

impl OrderSweeper {
    pub fn new(order_service: OrderService, actor: AuthUser, config: SweeperConfig) -> Self {
        Self {
            order_service,
            actor,
            config,
        }
    }

    /// Cancels orders still awaiting payment after the payment timeout.
    pub async fn cancel_expired_pending_payments(&self) -> AppResult<SweepReport> {
        let cutoff = Utc::now() - Duration::seconds(self.config.pending_payment_timeout_secs);
        let ids = self.order_service.find_expired_pending_orders(cutoff).await?;
        let report = sweep(ids, |id| self.order_service.cancel_order(self.actor, id)).await;
        report.log("pending-payment sweep");
        Ok(report)
    }

    /// Confirms shipped orders the buyer never confirmed.
    pub async fn confirm_stale_shipments(&self) -> AppResult<SweepReport> {
        let cutoff = Utc::now() - Duration::seconds(self.config.shipped_confirm_timeout_secs);
        let ids = self.order_service.find_stale_shipped_orders(cutoff).await?;
        let report = sweep(ids, |id| self.order_service.confirm_shipment(self.actor, id)).await;
        report.log("shipped-order sweep");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        OrderStatus, order_entity as orders, order_status_log_entity as order_status_logs,
        promotion_entity as promotions,
    };
    use crate::error::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweep_keeps_going_after_failures() {
        let report = sweep(vec![1, 2, 3, 4], |id| async move {
            if id % 2 == 0 {
                Err(AppError::ValidationError(format!("order {id} busy")))
            } else {
                Ok(id)
            }
        })
        .await;

        assert_eq!(report.succeeded, vec![1, 3]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].order_id, 2);
        assert!(report.failed[1].error.contains("order 4 busy"));
    }

    #[tokio::test]
    async fn test_sweep_empty_batch() {
        let report = sweep(vec![], |id| async move { Ok::<_, AppError>(id) }).await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_configured_system_actor_skips_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let config = SweeperConfig {
            system_actor_id: Some(42),
            ..SweeperConfig::default()
        };
        let actor = resolve_system_actor(&db, &config).await.unwrap().unwrap();
        assert_eq!(actor.id, 42);
        assert!(actor.is_super_admin());
    }

    #[tokio::test]
    async fn test_system_actor_falls_back_to_super_admin() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![users::Model {
                id: 1,
                name: "Admin Pusat".to_string(),
                email: "admin@tokoku.id".to_string(),
                role: UserRole::SuperAdmin,
                is_active: true,
                created_at: now,
                updated_at: now,
            }]])
            .into_connection();
        let actor = resolve_system_actor(&db, &SweeperConfig::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(actor.id, 1);
    }

    #[tokio::test]
    async fn test_no_system_actor_available() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let actor = resolve_system_actor(&db, &SweeperConfig::default())
            .await
            .unwrap();
        assert!(actor.is_none());
    }

    fn id_row(id: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::BigInt(Some(id)))])
    }

    fn order(id: i64, status: OrderStatus) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id,
            user_id: 9,
            store_id: 4,
            status,
            subtotal: 100_000,
            shipping_cost: 20_000,
            total: 120_000,
            transaction_voucher_id: None,
            delivery_voucher_id: None,
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(2),
        }
    }

    fn status_log(order_id: i64, from: OrderStatus, to: OrderStatus) -> order_status_logs::Model {
        order_status_logs::Model {
            id: 1,
            order_id,
            from_status: from,
            to_status: to,
            actor_id: 1,
            created_at: Utc::now(),
        }
    }

    fn rows_affected(n: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: n,
        }
    }

    fn sweeper(db: sea_orm::DatabaseConnection) -> OrderSweeper {
        let actor = AuthUser {
            id: 1,
            role: UserRole::SuperAdmin,
        };
        OrderSweeper::new(
            OrderService::new(Arc::new(db)),
            actor,
            SweeperConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_pending_payment_sweep_reports_each_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(11), id_row(12)]])
            .append_query_results([vec![order(11, OrderStatus::AwaitingPayment)]])
            .append_query_results([vec![status_log(
                11,
                OrderStatus::AwaitingPayment,
                OrderStatus::Cancelled,
            )]])
            // paid in the meantime and already shipped
            .append_query_results([vec![order(12, OrderStatus::Shipped)]])
            // status update, then voucher release with nothing to release
            .append_exec_results([rows_affected(1), rows_affected(0)])
            .into_connection();

        let report = sweeper(db).cancel_expired_pending_payments().await.unwrap();
        assert_eq!(report.succeeded, vec![11]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].order_id, 12);
    }

    #[tokio::test]
    async fn test_shipped_sweep_confirms_and_keeps_going() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(21), id_row(22)]])
            .append_query_results([vec![order(21, OrderStatus::Shipped)]])
            .append_query_results([vec![status_log(
                21,
                OrderStatus::Shipped,
                OrderStatus::Confirmed,
            )]])
            // no active bonus promotions of either source
            .append_query_results([
                Vec::<promotions::Model>::new(),
                Vec::<promotions::Model>::new(),
            ])
            .append_query_results([vec![order(22, OrderStatus::Processed)]])
            .append_exec_results([rows_affected(1)])
            .into_connection();

        let report = sweeper(db).confirm_stale_shipments().await.unwrap();
        assert_eq!(report.succeeded, vec![21]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].order_id, 22);
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_due() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&'static str, Value>>::new()])
            .into_connection();
        let report = sweeper(db).confirm_stale_shipments().await.unwrap();
        assert!(report.is_empty());
    }
}
