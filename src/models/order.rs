use crate::entities::{OrderStatus, order_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub store_id: i64,
    pub status: OrderStatus,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub total: i64,
    pub transaction_voucher_id: Option<i64>,
    pub delivery_voucher_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<OrderStatus>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            store_id: m.store_id,
            status: m.status,
            subtotal: m.subtotal,
            shipping_cost: m.shipping_cost,
            total: m.total,
            transaction_voucher_id: m.transaction_voucher_id,
            delivery_voucher_id: m.delivery_voucher_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
