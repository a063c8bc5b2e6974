use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    StoreId,
    Status,
    Subtotal,
    ShippingCost,
    Total,
    TransactionVoucherId,
    DeliveryVoucherId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderStatusLogs {
    Table,
    Id,
    OrderId,
    FromStatus,
    ToStatus,
    ActorId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vouchers {
    Table,
    Id,
    UserId,
    PromotionId,
    Code,
    VoucherType,
    DiscountType,
    DiscountValue,
    MinPurchase,
    MaxDeduction,
    StoreId,
    ExpiredAt,
    UsedAt,
    OrderId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Promotions {
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
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(&mut id_col(Orders::Id))
                    .col(ColumnDef::new(Orders::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::StoreId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .custom(Alias::new("order_status"))
                            .not_null()
                            .default(Expr::cust("'awaiting_payment'::order_status")),
                    )
                    .col(ColumnDef::new(Orders::Subtotal).big_integer().not_null())
                    .col(ColumnDef::new(Orders::ShippingCost).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Total).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::TransactionVoucherId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Orders::DeliveryVoucherId).big_integer().null())
                    .col(&mut now_col(Orders::CreatedAt))
                    .col(&mut now_col(Orders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 定时任务按状态 + 时间扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_status_created_at")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_status_updated_at")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .col(Orders::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderStatusLogs::Table)
                    .if_not_exists()
                    .col(&mut id_col(OrderStatusLogs::Id))
                    .col(
                        ColumnDef::new(OrderStatusLogs::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusLogs::FromStatus)
                            .custom(Alias::new("order_status"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusLogs::ToStatus)
                            .custom(Alias::new("order_status"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusLogs::ActorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut now_col(OrderStatusLogs::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(OrderStatusLogs::Table, OrderStatusLogs::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(&mut id_col(Vouchers::Id))
                    .col(ColumnDef::new(Vouchers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Vouchers::PromotionId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Vouchers::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Vouchers::VoucherType)
                            .custom(Alias::new("promotion_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vouchers::DiscountType)
                            .custom(Alias::new("discount_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vouchers::DiscountValue).big_integer().not_null())
                    .col(ColumnDef::new(Vouchers::MinPurchase).big_integer().null())
                    .col(ColumnDef::new(Vouchers::MaxDeduction).big_integer().null())
                    .col(ColumnDef::new(Vouchers::StoreId).big_integer().null())
                    .col(
                        ColumnDef::new(Vouchers::ExpiredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vouchers::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Vouchers::OrderId).big_integer().null())
                    .col(&mut now_col(Vouchers::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Vouchers::Table, Vouchers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Vouchers::Table, Vouchers::PromotionId)
                            .to(Promotions::Table, Promotions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Vouchers::Table, Vouchers::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_vouchers_user_promotion")
                    .table(Vouchers::Table)
                    .col(Vouchers::UserId)
                    .col(Vouchers::PromotionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Vouchers::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(OrderStatusLogs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Orders::Table).to_owned())
            .await?;
        Ok(())
    }
}
