use async_trait::async_trait;

use models::bill::BillFields;

use super::domain::{Bill, DateRange, PeriodTotal, UnpaidFilter};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Repository abstraction for bill persistence.
///
/// Implementations store the status they are given; deriving it is the
/// service's job.
#[async_trait]
pub trait BillRepository: Send + Sync {
    async fn insert(&self, fields: BillFields) -> Result<Bill, ServiceError>;
    /// Full replace; `NotFound` when `id` is unknown.
    async fn update(&self, id: i64, fields: BillFields) -> Result<Bill, ServiceError>;
    async fn find(&self, id: i64) -> Result<Option<Bill>, ServiceError>;
    /// All bills, due date descending.
    async fn list(&self, page: Pagination) -> Result<Page<Bill>, ServiceError>;
    /// Unpaid bills matching the filter, due date descending.
    async fn list_unpaid(&self, filter: &UnpaidFilter, page: Pagination) -> Result<Page<Bill>, ServiceError>;
    /// Paid amounts summed per payment month within `range`, oldest month first.
    async fn paid_totals_per_month(&self, range: &DateRange, page: Pagination) -> Result<Page<PeriodTotal>, ServiceError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}

/// Simple in-memory repository for tests and local runs without a database
pub mod mock {
    use super::*;
    use chrono::Datelike;
    use rust_decimal::Decimal;
    use std::cmp::Reverse;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryBillRepository {
        bills: Mutex<BTreeMap<i64, Bill>>,
        next_id: Mutex<i64>,
    }

    impl InMemoryBillRepository {
        pub fn len(&self) -> usize {
            self.bills.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn sorted(mut bills: Vec<Bill>) -> Vec<Bill> {
            // due date descending, undated last, newest id first on ties
            bills.sort_by_key(|b| (b.due_date.is_none(), Reverse(b.due_date), Reverse(b.id)));
            bills
        }
    }

    fn from_fields(id: i64, f: BillFields) -> Bill {
        Bill {
            id,
            due_date: f.due_date,
            payment_date: f.payment_date,
            amount: f.amount,
            description: f.description,
            status: f.status,
        }
    }

    #[async_trait]
    impl BillRepository for InMemoryBillRepository {
        async fn insert(&self, fields: BillFields) -> Result<Bill, ServiceError> {
            let id = {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                *next
            };
            let bill = from_fields(id, fields);
            self.bills.lock().unwrap().insert(id, bill.clone());
            Ok(bill)
        }

        async fn update(&self, id: i64, fields: BillFields) -> Result<Bill, ServiceError> {
            let mut bills = self.bills.lock().unwrap();
            let slot = bills.get_mut(&id).ok_or_else(|| ServiceError::not_found("bill", id))?;
            *slot = from_fields(id, fields);
            Ok(slot.clone())
        }

        async fn find(&self, id: i64) -> Result<Option<Bill>, ServiceError> {
            Ok(self.bills.lock().unwrap().get(&id).cloned())
        }

        async fn list(&self, page: Pagination) -> Result<Page<Bill>, ServiceError> {
            let all: Vec<Bill> = self.bills.lock().unwrap().values().cloned().collect();
            Ok(Page::from_sorted(Self::sorted(all), page))
        }

        async fn list_unpaid(&self, filter: &UnpaidFilter, page: Pagination) -> Result<Page<Bill>, ServiceError> {
            let matching: Vec<Bill> = self
                .bills
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.payment_date.is_none())
                .filter(|b| b.description == filter.description)
                .filter(|b| b.due_date.is_some_and(|d| filter.range.contains(d)))
                .cloned()
                .collect();
            Ok(Page::from_sorted(Self::sorted(matching), page))
        }

        async fn paid_totals_per_month(&self, range: &DateRange, page: Pagination) -> Result<Page<PeriodTotal>, ServiceError> {
            let mut totals: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
            for bill in self.bills.lock().unwrap().values() {
                if let Some(paid) = bill.payment_date.filter(|d| range.contains(*d)) {
                    *totals.entry((paid.year(), paid.month())).or_default() += bill.amount;
                }
            }
            let rows = totals
                .into_iter()
                .map(|((year, month), total_value)| PeriodTotal { period: format!("{:02}/{}", month, year), total_value })
                .collect();
            Ok(Page::from_sorted(rows, page))
        }

        async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
            Ok(self.bills.lock().unwrap().remove(&id).is_some())
        }
    }
}
