use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "promotion_scope")]
#[serde(rename_all = "snake_case")]
pub enum PromotionScope {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "store")]
    Store,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "promotion_source")]
#[serde(rename_all = "snake_case")]
pub enum PromotionSource {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "referral_bonus")]
    ReferralBonus,
    #[sea_orm(string_value = "referral_bonus_referee")]
    ReferralBonusReferee,
    #[sea_orm(string_value = "after_min_purchase")]
    AfterMinPurchase,
    #[sea_orm(string_value = "after_min_transaction")]
    AfterMinTransaction,
    #[sea_orm(string_value = "all_branch")]
    AllBranch,
}

impl PromotionSource {
    /// Sources granted automatically by platform rules rather than claimed by users.
    pub fn is_system_triggered(&self) -> bool {
        matches!(
            self,
            PromotionSource::ReferralBonus
                | PromotionSource::ReferralBonusReferee
                | PromotionSource::AfterMinPurchase
                | PromotionSource::AfterMinTransaction
        )
    }

    /// Advisory lock key for publishing promotions of this source.
    pub fn lock_key(&self) -> i32 {
        match self {
            PromotionSource::Manual => 0,
            PromotionSource::ReferralBonus => 1,
            PromotionSource::ReferralBonusReferee => 2,
            PromotionSource::AfterMinPurchase => 3,
            PromotionSource::AfterMinTransaction => 4,
            PromotionSource::AllBranch => 5,
        }
    }
}

impl std::fmt::Display for PromotionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionSource::Manual => write!(f, "manual"),
            PromotionSource::ReferralBonus => write!(f, "referral_bonus"),
            PromotionSource::ReferralBonusReferee => write!(f, "referral_bonus_referee"),
            PromotionSource::AfterMinPurchase => write!(f, "after_min_purchase"),
            PromotionSource::AfterMinTransaction => write!(f, "after_min_transaction"),
            PromotionSource::AllBranch => write!(f, "all_branch"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "promotion_state")]
#[serde(rename_all = "snake_case")]
pub enum PromotionState {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl std::fmt::Display for PromotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionState::Draft => write!(f, "draft"),
            PromotionState::Published => write!(f, "published"),
            PromotionState::Archived => write!(f, "archived"),
        }
    }
}

/// What a voucher of this promotion discounts: the item subtotal or the shipping cost.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "promotion_type")]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    #[sea_orm(string_value = "transaction")]
    Transaction,
    #[sea_orm(string_value = "delivery")]
    Delivery,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "discount_type")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "flat")]
    Flat,
    #[sea_orm(string_value = "percent")]
    Percent,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
