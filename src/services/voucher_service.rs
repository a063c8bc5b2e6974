use crate::entities::{
    OrderStatus, PromotionSource, PromotionState, order_entity as orders,
    promotion_entity as promotions, voucher_entity as vouchers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::generate_voucher_code;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

const MAX_CODE_ATTEMPTS: usize = 5;

async fn unique_voucher_code<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_voucher_code();
        let taken = vouchers::Entity::find()
            .filter(vouchers::Column::Code.eq(code.clone()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::InternalError(
        "Failed to generate a unique voucher code".to_string(),
    ))
}

async fn already_holds<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    promotion_id: i64,
) -> AppResult<bool> {
    let held = vouchers::Entity::find()
        .filter(vouchers::Column::UserId.eq(user_id))
        .filter(vouchers::Column::PromotionId.eq(promotion_id))
        .count(conn)
        .await?;
    Ok(held > 0)
}

fn quota_left(promo: &promotions::Model) -> bool {
    promo.quota.is_none_or(|q| promo.claimed < q)
}

/// Creates the voucher row and bumps the promotion's claimed counter.
async fn issue_voucher<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    promo: promotions::Model,
    now: DateTime<Utc>,
) -> AppResult<vouchers::Model> {
    let expired_at = match promo.coupon_duration_days {
        Some(days) => now + Duration::days(days as i64),
        None => promo.finished_at,
    };
    let code = unique_voucher_code(conn).await?;

    let voucher = vouchers::ActiveModel {
        user_id: Set(user_id),
        promotion_id: Set(promo.id),
        code: Set(code),
        voucher_type: Set(promo.promotion_type),
        discount_type: Set(promo.discount_type),
        discount_value: Set(promo.discount_value),
        min_purchase: Set(promo.min_purchase),
        max_deduction: Set(promo.max_deduction),
        store_id: Set(promo.store_id),
        expired_at: Set(expired_at),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let claimed = promo.claimed + 1;
    let mut am = promo.into_active_model();
    am.claimed = Set(claimed);
    am.updated_at = Set(now);
    am.update(conn).await?;

    Ok(voucher)
}

/// Locks the rows so `claimed` stays accurate against a concurrent claim or grant.
/// Rows are taken in id order.
async fn active_promotions<C: ConnectionTrait>(
    conn: &C,
    source: PromotionSource,
    now: DateTime<Utc>,
) -> AppResult<Vec<promotions::Model>> {
    let rows = promotions::Entity::find()
        .filter(promotions::Column::Source.eq(source))
        .filter(promotions::Column::State.eq(PromotionState::Published))
        .filter(promotions::Column::StartedAt.lte(now))
        .filter(promotions::Column::FinishedAt.gte(now))
        .order_by_asc(promotions::Column::Id)
        .lock_exclusive()
        .all(conn)
        .await?;
    Ok(rows)
}

/// Grants the buyer of a just-confirmed order the vouchers of every active
/// minimum-purchase promotion the order total reaches, and of every active
/// minimum-transaction promotion whose threshold equals the buyer's confirmed order count.
/// Returns how many vouchers were issued.
pub async fn grant_order_bonuses<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
) -> AppResult<usize> {
    let now = Utc::now();
    let mut eligible = Vec::new();

    for promo in active_promotions(conn, PromotionSource::AfterMinPurchase, now).await? {
        if promo.min_purchase.is_some_and(|min| order.total >= min) {
            eligible.push(promo);
        }
    }

    let min_transaction_promos =
        active_promotions(conn, PromotionSource::AfterMinTransaction, now).await?;
    if !min_transaction_promos.is_empty() {
        let confirmed = orders::Entity::find()
            .filter(orders::Column::UserId.eq(order.user_id))
            .filter(orders::Column::Status.eq(OrderStatus::Confirmed))
            .count(conn)
            .await?;
        eligible.extend(
            min_transaction_promos
                .into_iter()
                .filter(|p| p.min_transaction.is_some_and(|n| n as u64 == confirmed)),
        );
    }

    let mut granted = 0;
    for promo in eligible {
        if !quota_left(&promo) || already_holds(conn, order.user_id, promo.id).await? {
            continue;
        }
        let promotion_id = promo.id;
        issue_voucher(conn, order.user_id, promo, now).await?;
        log::info!(
            "Granted bonus voucher of promotion {promotion_id} to user {} for order {}",
            order.user_id,
            order.id
        );
        granted += 1;
    }
    Ok(granted)
}

#[derive(Clone)]
pub struct VoucherService {
    pool: Arc<DatabaseConnection>,
}

impl VoucherService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn claim_voucher(&self, user_id: i64, promotion_id: i64) -> AppResult<VoucherResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;

        // 锁住促销行，防止并发领取超出配额
        let promo = promotions::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;

        if promo.state != PromotionState::Published {
            return Err(AppError::ValidationError(
                "Promosi tidak tersedia".to_string(),
            ));
        }
        if promo.source.is_system_triggered() {
            return Err(AppError::ValidationError(
                "Voucher ini diberikan otomatis dan tidak dapat diklaim".to_string(),
            ));
        }
        if promo.finished_at < now {
            return Err(AppError::Gone("Promosi sudah berakhir".to_string()));
        }
        if promo.started_at > now {
            return Err(AppError::ValidationError(
                "Promosi belum dimulai".to_string(),
            ));
        }
        if !quota_left(&promo) {
            return Err(AppError::ValidationError(
                "Kuota voucher sudah habis".to_string(),
            ));
        }
        if already_holds(&txn, user_id, promo.id).await? {
            return Err(AppError::ValidationError(
                "Voucher sudah diklaim".to_string(),
            ));
        }

        let voucher = issue_voucher(&txn, user_id, promo, now).await?;
        txn.commit().await?;

        Ok(VoucherResponse::from_model(voucher, now))
    }

    pub async fn list_user_vouchers(
        &self,
        user_id: i64,
        query: &VoucherQuery,
    ) -> AppResult<PaginatedResponse<VoucherResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let now = Utc::now();

        let mut select = vouchers::Entity::find().filter(vouchers::Column::UserId.eq(user_id));
        select = match query.status {
            Some(VoucherStatus::Available) => select
                .filter(vouchers::Column::UsedAt.is_null())
                .filter(vouchers::Column::ExpiredAt.gte(now)),
            Some(VoucherStatus::Used) => select.filter(vouchers::Column::UsedAt.is_not_null()),
            Some(VoucherStatus::Expired) => select
                .filter(vouchers::Column::UsedAt.is_null())
                .filter(vouchers::Column::ExpiredAt.lt(now)),
            None => select,
        };

        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(vouchers::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|v| VoucherResponse::from_model(v, now))
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DiscountType, PromotionScope, PromotionType};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn promo(state: PromotionState, source: PromotionSource) -> promotions::Model {
        let now = Utc::now();
        promotions::Model {
            id: 3,
            name: "Voucher Belanja".to_string(),
            description: None,
            scope: PromotionScope::General,
            source,
            state,
            promotion_type: PromotionType::Transaction,
            discount_type: DiscountType::Flat,
            discount_value: 10_000,
            min_purchase: Some(50_000),
            max_deduction: None,
            min_transaction: None,
            started_at: now - Duration::days(1),
            finished_at: now + Duration::days(10),
            coupon_duration_days: Some(7),
            quota: Some(1),
            claimed: 0,
            store_id: None,
            created_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_quota_left() {
        let mut p = promo(PromotionState::Published, PromotionSource::Manual);
        assert!(quota_left(&p));
        p.claimed = 1;
        assert!(!quota_left(&p));
        p.quota = None;
        assert!(quota_left(&p));
    }

    #[tokio::test]
    async fn test_claim_draft_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![promo(PromotionState::Draft, PromotionSource::Manual)]])
            .into_connection();
        let svc = VoucherService::new(Arc::new(db));
        assert!(matches!(
            svc.claim_voucher(9, 3).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_claim_system_triggered_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![promo(
                PromotionState::Published,
                PromotionSource::ReferralBonus,
            )]])
            .into_connection();
        let svc = VoucherService::new(Arc::new(db));
        assert!(matches!(
            svc.claim_voucher(9, 3).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_claim_ended_promotion_is_gone() {
        let mut ended = promo(PromotionState::Published, PromotionSource::Manual);
        ended.started_at = Utc::now() - Duration::days(10);
        ended.finished_at = Utc::now() - Duration::days(1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ended]])
            .into_connection();
        let svc = VoucherService::new(Arc::new(db));
        assert!(matches!(svc.claim_voucher(9, 3).await, Err(AppError::Gone(_))));
    }

    #[tokio::test]
    async fn test_claim_exhausted_quota_rejected() {
        let mut full = promo(PromotionState::Published, PromotionSource::Manual);
        full.claimed = 1;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![full]])
            .into_connection();
        let svc = VoucherService::new(Arc::new(db));
        assert!(matches!(
            svc.claim_voucher(9, 3).await,
            Err(AppError::ValidationError(_))
        ));
    }

    fn bonus(id: i64, source: PromotionSource) -> promotions::Model {
        promotions::Model {
            id,
            quota: None,
            ..promo(PromotionState::Published, source)
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn confirmed_order(total: i64) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 11,
            user_id: 9,
            store_id: 4,
            status: OrderStatus::Confirmed,
            subtotal: total,
            shipping_cost: 0,
            total,
            transaction_voucher_id: None,
            delivery_voucher_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn issued(promotion_id: i64) -> vouchers::Model {
        let now = Utc::now();
        vouchers::Model {
            id: 40,
            user_id: 9,
            promotion_id,
            code: "PROMO-ABCDEFGH".to_string(),
            voucher_type: PromotionType::Transaction,
            discount_type: DiscountType::Flat,
            discount_value: 10_000,
            min_purchase: Some(50_000),
            max_deduction: None,
            store_id: None,
            expired_at: now + Duration::days(7),
            used_at: None,
            order_id: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_grant_min_purchase_bonus() {
        let reachable = bonus(3, PromotionSource::AfterMinPurchase);
        let too_high = promotions::Model {
            min_purchase: Some(200_000),
            ..bonus(4, PromotionSource::AfterMinPurchase)
        };
        let full = promotions::Model {
            quota: Some(2),
            claimed: 2,
            ..bonus(5, PromotionSource::AfterMinPurchase)
        };
        let held = bonus(6, PromotionSource::AfterMinPurchase);
        let bumped = promotions::Model {
            claimed: 1,
            ..reachable.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reachable, too_high, full, held]])
            .append_query_results([Vec::<promotions::Model>::new()])
            // promotion 3: not held yet, code is free
            .append_query_results([vec![count_row(0)], vec![count_row(0)]])
            .append_query_results([vec![issued(3)]])
            .append_query_results([vec![bumped]])
            // promotion 6: already held
            .append_query_results([vec![count_row(1)]])
            .into_connection();

        let granted = grant_order_bonuses(&db, &confirmed_order(100_000))
            .await
            .unwrap();
        assert_eq!(granted, 1);

        let log = db.into_transaction_log();
        let first = format!("{:?}", log[0]);
        assert!(first.contains("FOR UPDATE"), "{first}");
    }

    #[tokio::test]
    async fn test_grant_min_transaction_on_exact_count() {
        let third = promotions::Model {
            min_purchase: None,
            min_transaction: Some(3),
            ..bonus(7, PromotionSource::AfterMinTransaction)
        };
        let fifth = promotions::Model {
            min_purchase: None,
            min_transaction: Some(5),
            ..bonus(8, PromotionSource::AfterMinTransaction)
        };
        let bumped = promotions::Model {
            claimed: 1,
            ..third.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<promotions::Model>::new()])
            .append_query_results([vec![third, fifth]])
            // confirmed orders, then holds / code checks for promotion 7
            .append_query_results([vec![count_row(3)], vec![count_row(0)], vec![count_row(0)]])
            .append_query_results([vec![issued(7)]])
            .append_query_results([vec![bumped]])
            .into_connection();

        let granted = grant_order_bonuses(&db, &confirmed_order(10_000))
            .await
            .unwrap();
        assert_eq!(granted, 1);
    }

    #[tokio::test]
    async fn test_grant_min_transaction_past_threshold_skipped() {
        let third = promotions::Model {
            min_purchase: None,
            min_transaction: Some(3),
            ..bonus(7, PromotionSource::AfterMinTransaction)
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<promotions::Model>::new()])
            .append_query_results([vec![third]])
            .append_query_results([vec![count_row(4)]])
            .into_connection();

        let granted = grant_order_bonuses(&db, &confirmed_order(10_000))
            .await
            .unwrap();
        assert_eq!(granted, 0);
    }
}
