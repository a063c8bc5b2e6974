use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Stores {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StoreAdmins {
    Table,
    Id,
    StoreId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Inventories {
    Table,
    Id,
    StoreId,
    ProductId,
    Stock,
    CreatedAt,
    UpdatedAt,
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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Role)
                            .custom(Alias::new("user_role"))
                            .not_null()
                            .default(Expr::cust("'user'::user_role")),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(&mut now_col(Users::CreatedAt))
                    .col(&mut now_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(&mut id_col(Stores::Id))
                    .col(ColumnDef::new(Stores::Name).string_len(255).not_null())
                    .col(&mut now_col(Stores::CreatedAt))
                    .col(&mut now_col(Stores::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StoreAdmins::Table)
                    .if_not_exists()
                    .col(&mut id_col(StoreAdmins::Id))
                    .col(ColumnDef::new(StoreAdmins::StoreId).big_integer().not_null())
                    .col(ColumnDef::new(StoreAdmins::UserId).big_integer().not_null())
                    .col(&mut now_col(StoreAdmins::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreAdmins::Table, StoreAdmins::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreAdmins::Table, StoreAdmins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_store_admins_store_user")
                    .table(StoreAdmins::Table)
                    .col(StoreAdmins::StoreId)
                    .col(StoreAdmins::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inventories::Table)
                    .if_not_exists()
                    .col(&mut id_col(Inventories::Id))
                    .col(ColumnDef::new(Inventories::StoreId).big_integer().not_null())
                    .col(ColumnDef::new(Inventories::ProductId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Inventories::Stock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(&mut now_col(Inventories::CreatedAt))
                    .col(&mut now_col(Inventories::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Inventories::Table, Inventories::StoreId)
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
                    .name("uq_inventories_store_product")
                    .table(Inventories::Table)
                    .col(Inventories::StoreId)
                    .col(Inventories::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Inventories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(StoreAdmins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Stores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
