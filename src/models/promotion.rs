use crate::entities::{
    DiscountType, PromotionScope, PromotionSource, PromotionState, PromotionType,
    promotion_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub name: String,
    pub description: Option<String>,
    pub scope: PromotionScope,
    pub source: PromotionSource,
    /// draft (default) or published
    pub state: Option<PromotionState>,
    pub promotion_type: PromotionType,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub max_deduction: Option<i64>,
    pub min_transaction: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub coupon_duration_days: Option<i32>,
    pub quota: Option<i32>,
    pub store_id: Option<i64>,
}

/// Partial update. `scope` and `source` are accepted by the decoder only so that a
/// request carrying them can be refused explicitly.
///
/// An omitted or `null` field keeps its current value, so optional terms such as
/// `quota` or `max_deduction` cannot be cleared through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePromotionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scope: Option<PromotionScope>,
    pub source: Option<PromotionSource>,
    pub promotion_type: Option<PromotionType>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub min_purchase: Option<i64>,
    pub max_deduction: Option<i64>,
    pub min_transaction: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub coupon_duration_days: Option<i32>,
    pub quota: Option<i32>,
}

impl UpdatePromotionRequest {
    /// Whether applying this patch to a published promotion needs the publish checks again.
    pub fn touches_publish_rules(&self) -> bool {
        self.started_at.is_some() || self.finished_at.is_some() || self.min_purchase.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePromotionStateRequest {
    pub state: PromotionState,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromotionQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub state: Option<PromotionState>,
    pub scope: Option<PromotionScope>,
    pub source: Option<PromotionSource>,
    pub store_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromotionResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub scope: PromotionScope,
    pub source: PromotionSource,
    pub state: PromotionState,
    pub promotion_type: PromotionType,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub max_deduction: Option<i64>,
    pub min_transaction: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub coupon_duration_days: Option<i32>,
    pub quota: Option<i32>,
    pub claimed: i32,
    pub store_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<promotion_entity::Model> for PromotionResponse {
    fn from(m: promotion_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            scope: m.scope,
            source: m.source,
            state: m.state,
            promotion_type: m.promotion_type,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            min_purchase: m.min_purchase,
            max_deduction: m.max_deduction,
            min_transaction: m.min_transaction,
            started_at: m.started_at,
            finished_at: m.finished_at,
            coupon_duration_days: m.coupon_duration_days,
            quota: m.quota,
            claimed: m.claimed,
            store_id: m.store_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
