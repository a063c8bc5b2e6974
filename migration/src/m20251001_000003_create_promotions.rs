use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Promotions {
    Table,
    Id,
    Name,
    Description,
    Scope,
    Source,
    State,
    PromotionType,
    DiscountType,
    DiscountValue,
    MinPurchase,
    MaxDeduction,
    MinTransaction,
    StartedAt,
    FinishedAt,
    CouponDurationDays,
    Quota,
    Claimed,
    StoreId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FreeProductPromotions {
    Table,
    Id,
    InventoryId,
    State,
    BuyQuantity,
    FreeQuantity,
    StartedAt,
    FinishedAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DiscountProductPromotions {
    Table,
    Id,
    InventoryId,
    State,
    DiscountType,
    DiscountValue,
    MaxDeduction,
    StartedAt,
    FinishedAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Inventories {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Stores {
    Table,
    Id,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn enum_col<T: IntoIden>(col: T, type_name: &str) -> ColumnDef {
    ColumnDef::new(col)
        .custom(Alias::new(type_name))
        .not_null()
        .to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn now_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::cust("NOW()"))
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Promotions::Table)
                    .if_not_exists()
                    .col(&mut id_col(Promotions::Id))
                    .col(ColumnDef::new(Promotions::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Promotions::Description).text().null())
                    .col(&mut enum_col(Promotions::Scope, "promotion_scope"))
                    .col(&mut enum_col(Promotions::Source, "promotion_source"))
                    .col(&mut enum_col(Promotions::State, "promotion_state"))
                    .col(&mut enum_col(Promotions::PromotionType, "promotion_type"))
                    .col(&mut enum_col(Promotions::DiscountType, "discount_type"))
                    .col(
                        ColumnDef::new(Promotions::DiscountValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Promotions::MinPurchase).big_integer().null())
                    .col(ColumnDef::new(Promotions::MaxDeduction).big_integer().null())
                    .col(ColumnDef::new(Promotions::MinTransaction).integer().null())
                    .col(&mut timestamp_col(Promotions::StartedAt))
                    .col(&mut timestamp_col(Promotions::FinishedAt))
                    .col(ColumnDef::new(Promotions::CouponDurationDays).integer().null())
                    .col(ColumnDef::new(Promotions::Quota).integer().null())
                    .col(
                        ColumnDef::new(Promotions::Claimed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Promotions::StoreId).big_integer().null())
                    .col(ColumnDef::new(Promotions::CreatedBy).big_integer().not_null())
                    .col(&mut now_col(Promotions::CreatedAt))
                    .col(&mut now_col(Promotions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Promotions::Table, Promotions::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promotions_source_state")
                    .table(Promotions::Table)
                    .col(Promotions::Source)
                    .col(Promotions::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FreeProductPromotions::Table)
                    .if_not_exists()
                    .col(&mut id_col(FreeProductPromotions::Id))
                    .col(
                        ColumnDef::new(FreeProductPromotions::InventoryId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut enum_col(FreeProductPromotions::State, "promotion_state"))
                    .col(
                        ColumnDef::new(FreeProductPromotions::BuyQuantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(FreeProductPromotions::FreeQuantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(&mut timestamp_col(FreeProductPromotions::StartedAt))
                    .col(&mut timestamp_col(FreeProductPromotions::FinishedAt))
                    .col(
                        ColumnDef::new(FreeProductPromotions::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut now_col(FreeProductPromotions::CreatedAt))
                    .col(&mut now_col(FreeProductPromotions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(FreeProductPromotions::Table, FreeProductPromotions::InventoryId)
                            .to(Inventories::Table, Inventories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_free_product_promotions_inventory_state")
                    .table(FreeProductPromotions::Table)
                    .col(FreeProductPromotions::InventoryId)
                    .col(FreeProductPromotions::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DiscountProductPromotions::Table)
                    .if_not_exists()
                    .col(&mut id_col(DiscountProductPromotions::Id))
                    .col(
                        ColumnDef::new(DiscountProductPromotions::InventoryId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut enum_col(
                        DiscountProductPromotions::State,
                        "promotion_state",
                    ))
                    .col(&mut enum_col(
                        DiscountProductPromotions::DiscountType,
                        "discount_type",
                    ))
                    .col(
                        ColumnDef::new(DiscountProductPromotions::DiscountValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountProductPromotions::MaxDeduction)
                            .big_integer()
                            .null(),
                    )
                    .col(&mut timestamp_col(DiscountProductPromotions::StartedAt))
                    .col(&mut timestamp_col(DiscountProductPromotions::FinishedAt))
                    .col(
                        ColumnDef::new(DiscountProductPromotions::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut now_col(DiscountProductPromotions::CreatedAt))
                    .col(&mut now_col(DiscountProductPromotions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                DiscountProductPromotions::Table,
                                DiscountProductPromotions::InventoryId,
                            )
                            .to(Inventories::Table, Inventories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_discount_product_promotions_inventory_state")
                    .table(DiscountProductPromotions::Table)
                    .col(DiscountProductPromotions::InventoryId)
                    .col(DiscountProductPromotions::State)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DiscountProductPromotions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(FreeProductPromotions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Promotions::Table).to_owned())
            .await?;
        Ok(())
    }
}
