//! Create `bill` table.
//!
//! `due_date` is nullable so a CSV row whose due date failed to parse can still be stored;
//! the HTTP layer requires it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bill::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bill::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(date_null(Bill::DueDate))
                    .col(date_null(Bill::PaymentDate))
                    .col(decimal(Bill::Amount).not_null())
                    .col(text(Bill::Description).not_null())
                    .col(string_len(Bill::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Bill::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Bill::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Bill::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Bill {
    Table,
    Id,
    DueDate,
    PaymentDate,
    Amount,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}
