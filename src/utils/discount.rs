//! Voucher and promotion discount arithmetic.
//!
//! All amounts are whole rupiah. Percent discounts round the deduction down.

use crate::entities::{DiscountType, voucher_entity};
use serde::Serialize;
use utoipa::ToSchema;

/// The parts of a promotion or voucher that determine how much it takes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountRule {
    pub discount_type: DiscountType,
    pub value: i64,
    pub max_deduction: Option<i64>,
}

impl DiscountRule {
    pub fn flat(value: i64) -> Self {
        Self {
            discount_type: DiscountType::Flat,
            value,
            max_deduction: None,
        }
    }

    pub fn percent(value: i64, max_deduction: Option<i64>) -> Self {
        Self {
            discount_type: DiscountType::Percent,
            value,
            max_deduction,
        }
    }
}

impl From<&voucher_entity::Model> for DiscountRule {
    fn from(v: &voucher_entity::Model) -> Self {
        Self {
            discount_type: v.discount_type,
            value: v.discount_value,
            max_deduction: v.max_deduction,
        }
    }
}

/// Amount taken off `base`. Never exceeds `base`.
pub fn discount_amount(base: i64, rule: &DiscountRule) -> i64 {
    let base = base.max(0);
    let raw = match rule.discount_type {
        DiscountType::Flat => rule.value.max(0),
        DiscountType::Percent => {
            let pct = rule.value.clamp(0, 100) as i128;
            let raw = (base as i128 * pct / 100) as i64;
            // 封顶的是优惠金额本身，而不是结果金额
            match rule.max_deduction {
                Some(cap) => raw.min(cap.max(0)),
                None => raw,
            }
        }
    };
    raw.min(base)
}

/// Final charged amount after applying `rule` to `base`.
pub fn compute_discounted_amount(base: i64, rule: &DiscountRule) -> i64 {
    let base = base.max(0);
    base - discount_amount(base, rule)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CheckoutBreakdown {
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub subtotal_discount: i64,
    pub shipping_discount: i64,
    pub discounted_subtotal: i64,
    pub discounted_shipping_cost: i64,
    pub total: i64,
}

/// Applies the transaction voucher to the item subtotal and the delivery voucher to the
/// shipping cost. Each figure is discounted on its own; neither voucher sees the other amount.
pub fn apply_checkout_vouchers(
    subtotal: i64,
    shipping_cost: i64,
    transaction: Option<&DiscountRule>,
    delivery: Option<&DiscountRule>,
) -> CheckoutBreakdown {
    let subtotal = subtotal.max(0);
    let shipping_cost = shipping_cost.max(0);

    let subtotal_discount = transaction.map_or(0, |d| discount_amount(subtotal, d));
    let shipping_discount = delivery.map_or(0, |d| discount_amount(shipping_cost, d));

    let discounted_subtotal = subtotal - subtotal_discount;
    let discounted_shipping_cost = shipping_cost - shipping_discount;

    CheckoutBreakdown {
        subtotal,
        shipping_cost,
        subtotal_discount,
        shipping_discount,
        discounted_subtotal,
        discounted_shipping_cost,
        total: discounted_subtotal + discounted_shipping_cost,
    }
}
