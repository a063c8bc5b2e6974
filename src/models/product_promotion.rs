use crate::entities::{
    DiscountType, PromotionState, discount_product_promotion_entity,
    free_product_promotion_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFreeProductPromotionRequest {
    pub inventory_id: i64,
    pub state: Option<PromotionState>,
    pub buy_quantity: i32,
    pub free_quantity: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateFreeProductPromotionRequest {
    pub buy_quantity: Option<i32>,
    pub free_quantity: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDiscountProductPromotionRequest {
    pub inventory_id: i64,
    pub state: Option<PromotionState>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_deduction: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Omitted or `null` fields keep their current value; `max_deduction` cannot be cleared here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDiscountProductPromotionRequest {
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub max_deduction: Option<i64>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductPromotionQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub inventory_id: Option<i64>,
    pub state: Option<PromotionState>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FreeProductPromotionResponse {
    pub id: i64,
    pub inventory_id: i64,
    pub state: PromotionState,
    pub buy_quantity: i32,
    pub free_quantity: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<free_product_promotion_entity::Model> for FreeProductPromotionResponse {
    fn from(m: free_product_promotion_entity::Model) -> Self {
        Self {
            id: m.id,
            inventory_id: m.inventory_id,
            state: m.state,
            buy_quantity: m.buy_quantity,
            free_quantity: m.free_quantity,
            started_at: m.started_at,
            finished_at: m.finished_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscountProductPromotionResponse {
    pub id: i64,
    pub inventory_id: i64,
    pub state: PromotionState,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_deduction: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<discount_product_promotion_entity::Model> for DiscountProductPromotionResponse {
    fn from(m: discount_product_promotion_entity::Model) -> Self {
        Self {
            id: m.id,
            inventory_id: m.inventory_id,
            state: m.state,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            max_deduction: m.max_deduction,
            started_at: m.started_at,
            finished_at: m.finished_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
