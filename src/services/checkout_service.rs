use crate::entities::{PromotionType, voucher_entity as vouchers};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{DiscountRule, apply_checkout_vouchers};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;

/// Checks that a voucher may be spent on this checkout.
fn ensure_usable(
    voucher: &vouchers::Model,
    user_id: i64,
    expected: PromotionType,
    req: &CheckoutQuoteRequest,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if voucher.user_id != user_id {
        return Err(AppError::NotFound("Voucher tidak ditemukan".to_string()));
    }
    if voucher.voucher_type != expected {
        let msg = match expected {
            PromotionType::Transaction => "Voucher ini bukan voucher transaksi",
            PromotionType::Delivery => "Voucher ini bukan voucher ongkos kirim",
        };
        return Err(AppError::ValidationError(msg.to_string()));
    }
    if voucher.used_at.is_some() {
        return Err(AppError::ValidationError(
            "Voucher sudah digunakan".to_string(),
        ));
    }
    if voucher.expired_at < now {
        return Err(AppError::Gone("Voucher sudah kedaluwarsa".to_string()));
    }
    if let Some(store_id) = voucher.store_id
        && store_id != req.store_id
    {
        return Err(AppError::ValidationError(
            "Voucher tidak berlaku untuk toko ini".to_string(),
        ));
    }
    if let Some(min) = voucher.min_purchase
        && req.subtotal < min
    {
        return Err(AppError::ValidationError(format!(
            "Minimal pembelian untuk voucher ini adalah Rp{min}"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CheckoutService {
    pool: Arc<DatabaseConnection>,
}

impl CheckoutService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    async fn load_voucher(
        &self,
        id: Option<i64>,
        user_id: i64,
        expected: PromotionType,
        req: &CheckoutQuoteRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Option<DiscountRule>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let voucher = vouchers::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Voucher tidak ditemukan".to_string()))?;
        ensure_usable(&voucher, user_id, expected, req, now)?;
        Ok(Some(DiscountRule::from(&voucher)))
    }

    /// Prices a cart with up to one transaction voucher and one delivery voucher.
    /// Nothing is reserved; vouchers are only marked used when an order is placed.
    pub async fn quote(
        &self,
        user_id: i64,
        req: &CheckoutQuoteRequest,
    ) -> AppResult<CheckoutQuoteResponse> {
        if req.subtotal < 0 || req.shipping_cost < 0 {
            return Err(AppError::ValidationError(
                "Subtotal dan ongkos kirim tidak boleh negatif".to_string(),
            ));
        }

        let now = Utc::now();
        let transaction = self
            .load_voucher(
                req.transaction_voucher_id,
                user_id,
                PromotionType::Transaction,
                req,
                now,
            )
            .await?;
        let delivery = self
            .load_voucher(
                req.delivery_voucher_id,
                user_id,
                PromotionType::Delivery,
                req,
                now,
            )
            .await?;

        let breakdown = apply_checkout_vouchers(
            req.subtotal,
            req.shipping_cost,
            transaction.as_ref(),
            delivery.as_ref(),
        );

        Ok(CheckoutQuoteResponse {
            breakdown,
            transaction_voucher_id: req.transaction_voucher_id,
            delivery_voucher_id: req.delivery_voucher_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DiscountType;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn voucher(id: i64, voucher_type: PromotionType) -> vouchers::Model {
        let now = Utc::now();
        vouchers::Model {
            id,
            user_id: 9,
            promotion_id: 1,
            code: format!("PROMO-{id:08}"),
            voucher_type,
            discount_type: DiscountType::Percent,
            discount_value: 20,
            min_purchase: Some(50_000),
            max_deduction: Some(15_000),
            store_id: None,
            expired_at: now + Duration::days(3),
            used_at: None,
            order_id: None,
            created_at: now,
        }
    }

    fn request(transaction: Option<i64>, delivery: Option<i64>) -> CheckoutQuoteRequest {
        CheckoutQuoteRequest {
            store_id: 4,
            subtotal: 100_000,
            shipping_cost: 20_000,
            transaction_voucher_id: transaction,
            delivery_voucher_id: delivery,
        }
    }

    #[test]
    fn test_usable_voucher_checks() {
        let now = Utc::now();
        let req = request(Some(1), None);
        let v = voucher(1, PromotionType::Transaction);
        assert!(ensure_usable(&v, 9, PromotionType::Transaction, &req, now).is_ok());

        assert!(matches!(
            ensure_usable(&v, 10, PromotionType::Transaction, &req, now),
            Err(AppError::NotFound(_))
        ));
        assert!(ensure_usable(&v, 9, PromotionType::Delivery, &req, now).is_err());

        let used = vouchers::Model {
            used_at: Some(now),
            ..v.clone()
        };
        assert!(ensure_usable(&used, 9, PromotionType::Transaction, &req, now).is_err());

        let expired = vouchers::Model {
            expired_at: now - Duration::hours(1),
            ..v.clone()
        };
        assert!(matches!(
            ensure_usable(&expired, 9, PromotionType::Transaction, &req, now),
            Err(AppError::Gone(_))
        ));

        let other_store = vouchers::Model {
            store_id: Some(5),
            ..v.clone()
        };
        assert!(ensure_usable(&other_store, 9, PromotionType::Transaction, &req, now).is_err());

        let small_cart = CheckoutQuoteRequest {
            subtotal: 40_000,
            ..request(Some(1), None)
        };
        assert!(ensure_usable(&v, 9, PromotionType::Transaction, &small_cart, now).is_err());
    }

    #[tokio::test]
    async fn test_quote_with_both_vouchers() {
        let mut delivery = voucher(2, PromotionType::Delivery);
        delivery.discount_type = DiscountType::Flat;
        delivery.discount_value = 25_000;
        delivery.max_deduction = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![voucher(1, PromotionType::Transaction)]])
            .append_query_results([vec![delivery]])
            .into_connection();
        let svc = CheckoutService::new(Arc::new(db));

        let quote = svc.quote(9, &request(Some(1), Some(2))).await.unwrap();
        assert_eq!(quote.breakdown.discounted_subtotal, 85_000);
        assert_eq!(quote.breakdown.discounted_shipping_cost, 0);
        assert_eq!(quote.breakdown.total, 85_000);
    }

    #[tokio::test]
    async fn test_quote_without_vouchers_touches_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = CheckoutService::new(Arc::new(db));
        let quote = svc.quote(9, &request(None, None)).await.unwrap();
        assert_eq!(quote.breakdown.total, 120_000);
    }

    #[tokio::test]
    async fn test_quote_negative_amount_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = CheckoutService::new(Arc::new(db));
        let req = CheckoutQuoteRequest {
            shipping_cost: -1,
            ..request(None, None)
        };
        assert!(matches!(
            svc.quote(9, &req).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
