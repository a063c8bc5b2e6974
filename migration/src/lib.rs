pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_enums;
mod m20251001_000002_create_stores;
mod m20251001_000003_create_promotions;
mod m20251001_000004_create_orders_and_vouchers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_enums::Migration),
            Box::new(m20251001_000002_create_stores::Migration),
            Box::new(m20251001_000003_create_promotions::Migration),
            Box::new(m20251001_000004_create_orders_and_vouchers::Migration),
        ]
    }
}
