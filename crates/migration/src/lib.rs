//! Migrator for the payables schema.
//! Indexes are applied after the tables they cover.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_bill;
mod m20240601_000002_add_bill_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_bill::Migration),
            Box::new(m20240601_000002_add_bill_indexes::Migration),
        ]
    }
}
