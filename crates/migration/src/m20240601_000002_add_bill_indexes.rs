use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // list and unpaid filter both order by due_date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bill_due_date")
                    .table(Bill::Table)
                    .col(Bill::DueDate)
                    .to_owned(),
            )
            .await?;

        // monthly paid totals scan by payment_date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bill_payment_date")
                    .table(Bill::Table)
                    .col(Bill::PaymentDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_bill_due_date").table(Bill::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bill_payment_date").table(Bill::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Bill { Table, DueDate, PaymentDate }
