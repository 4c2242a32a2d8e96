use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, debug, instrument};

use models::bill::today;

use super::csv_import::{self, ImportReport};
use super::domain::{Bill, BillInput, DateRange, PeriodTotal, UnpaidFilter};
use super::repository::BillRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Bill business service independent of web framework
pub struct BillService<R: BillRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BillRepository + ?Sized> BillService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate and store a new bill with its status derived for today.
    ///
    /// # Examples
    /// ```
    /// use service::bill::{BillService, domain::BillInput, repository::mock::InMemoryBillRepository};
    /// use models::bill::BillStatus;
    /// use std::sync::Arc;
    /// let svc = BillService::new(Arc::new(InMemoryBillRepository::default()));
    /// let input = BillInput {
    ///     due_date: chrono::NaiveDate::from_ymd_opt(2000, 1, 1),
    ///     payment_date: None,
    ///     amount: Some(rust_decimal::Decimal::new(1000, 2)),
    ///     description: Some("Water".into()),
    /// };
    /// let bill = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(bill.status, BillStatus::Overdue);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: BillInput) -> Result<Bill, ServiceError> {
        let new_bill = input.validate()?;
        let bill = self.repo.insert(new_bill.into_fields(today())).await?;
        info!(id = bill.id, status = ?bill.status, "bill_created");
        Ok(bill)
    }

    /// Full replace of every field of an existing bill.
    #[instrument(skip(self, input))]
    pub async fn replace(&self, id: i64, input: BillInput) -> Result<Bill, ServiceError> {
        self.require(id).await?;
        let new_bill = input.validate()?;
        let bill = self.repo.update(id, new_bill.into_fields(today())).await?;
        info!(id, status = ?bill.status, "bill_replaced");
        Ok(bill)
    }

    /// `paid = true` stamps today's date as the payment date; `false` clears it.
    #[instrument(skip(self))]
    pub async fn set_paid(&self, id: i64, paid: bool) -> Result<Bill, ServiceError> {
        let mut bill = self.require(id).await?;
        if paid {
            bill.mark_paid(today());
        } else {
            bill.mark_unpaid(today());
        }
        let bill = self.repo.update(id, bill.fields()).await?;
        info!(id, status = ?bill.status, "bill_status_updated");
        Ok(bill)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Bill, ServiceError> {
        self.require(id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: Pagination) -> Result<Page<Bill>, ServiceError> {
        self.repo.list(page).await
    }

    #[instrument(skip(self))]
    pub async fn list_unpaid(&self, filter: UnpaidFilter, page: Pagination) -> Result<Page<Bill>, ServiceError> {
        self.repo.list_unpaid(&filter, page).await
    }

    #[instrument(skip(self))]
    pub async fn paid_totals_per_month(&self, start: NaiveDate, end: NaiveDate, page: Pagination) -> Result<Page<PeriodTotal>, ServiceError> {
        self.repo.paid_totals_per_month(&DateRange { start, end }, page).await
    }

    /// Deleting an unknown id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let removed = self.repo.delete(id).await?;
        debug!(id, removed, "bill_delete");
        Ok(())
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn import_csv(&self, data: &[u8]) -> Result<ImportReport, ServiceError> {
        csv_import::import(self.repo.as_ref(), data, today()).await
    }

    async fn require(&self, id: i64) -> Result<Bill, ServiceError> {
        self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("bill", id))
    }
}
