use crate::entities::{DiscountType, PromotionType, voucher_entity};
use crate::utils::CheckoutBreakdown;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    Available,
    Used,
    Expired,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimVoucherRequest {
    pub promotion_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<VoucherStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherResponse {
    pub id: i64,
    pub promotion_id: i64,
    pub code: String,
    pub voucher_type: PromotionType,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub max_deduction: Option<i64>,
    pub store_id: Option<i64>,
    pub status: VoucherStatus,
    pub expired_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VoucherResponse {
    pub fn from_model(m: voucher_entity::Model, now: DateTime<Utc>) -> Self {
        let status = if m.used_at.is_some() {
            VoucherStatus::Used
        } else if m.expired_at < now {
            VoucherStatus::Expired
        } else {
            VoucherStatus::Available
        };
        Self {
            id: m.id,
            promotion_id: m.promotion_id,
            code: m.code,
            voucher_type: m.voucher_type,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            min_purchase: m.min_purchase,
            max_deduction: m.max_deduction,
            store_id: m.store_id,
            status,
            expired_at: m.expired_at,
            used_at: m.used_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutQuoteRequest {
    pub store_id: i64,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub transaction_voucher_id: Option<i64>,
    pub delivery_voucher_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutQuoteResponse {
    #[serde(flatten)]
    pub breakdown: CheckoutBreakdown,
    pub transaction_voucher_id: Option<i64>,
    pub delivery_voucher_id: Option<i64>,
}
