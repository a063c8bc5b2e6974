use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

const ENUMS: &[(&str, &[&str])] = &[
    ("user_role", &["super admin", "store admin", "user"]),
    ("promotion_scope", &["general", "store"]),
    (
        "promotion_source",
        &[
            "manual",
            "referral_bonus",
            "referral_bonus_referee",
            "after_min_purchase",
            "after_min_transaction",
            "all_branch",
        ],
    ),
    ("promotion_state", &["draft", "published", "archived"]),
    ("promotion_type", &["transaction", "delivery"]),
    ("discount_type", &["flat", "percent"]),
    (
        "order_status",
        &[
            "awaiting_payment",
            "awaiting_confirmation",
            "processed",
            "shipped",
            "confirmed",
            "cancelled",
        ],
    ),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, values) in ENUMS {
            manager
                .create_type(
                    Type::create()
                        .as_enum(Alias::new(*name))
                        .values(values.iter().map(|v| Alias::new(*v)))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in ENUMS.iter().rev() {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(*name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
