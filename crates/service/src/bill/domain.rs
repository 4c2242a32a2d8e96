use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use models::bill::{derive_status, validate_amount, BillFields, BillStatus};

use crate::errors::ServiceError;

/// Domain bill (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub due_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub description: String,
    pub status: BillStatus,
}

impl Bill {
    pub fn refresh_status(&mut self, today: NaiveDate) {
        self.status = derive_status(self.due_date, self.payment_date, today);
    }

    pub fn mark_paid(&mut self, today: NaiveDate) {
        self.payment_date = Some(today);
        self.status = BillStatus::Paid;
    }

    pub fn mark_unpaid(&mut self, today: NaiveDate) {
        self.payment_date = None;
        self.refresh_status(today);
    }

    pub fn fields(&self) -> BillFields {
        BillFields {
            due_date: self.due_date,
            payment_date: self.payment_date,
            amount: self.amount,
            description: self.description.clone(),
            status: self.status,
        }
    }
}

impl From<models::bill::Model> for Bill {
    fn from(m: models::bill::Model) -> Self {
        Self {
            id: m.id,
            due_date: m.due_date,
            payment_date: m.payment_date,
            amount: m.amount,
            description: m.description,
            status: m.status,
        }
    }
}

/// Create/replace payload. Every field is optional so that missing values
/// surface as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillInput {
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

impl BillInput {
    /// Collect every violation, then build the bill.
    pub fn validate(self) -> Result<NewBill, ServiceError> {
        let mut violations = Vec::new();
        if self.due_date.is_none() {
            violations.push("due_date must not be null".to_string());
        }
        match &self.amount {
            None => violations.push("amount must not be null".to_string()),
            Some(a) => {
                if let Err(e) = validate_amount(a) {
                    violations.push(match e {
                        models::errors::ModelError::Validation(msg) => msg,
                        other => other.to_string(),
                    });
                }
            }
        }
        if self.description.is_none() {
            violations.push("description must not be null".to_string());
        }
        match (self.amount, self.description) {
            (Some(amount), Some(description)) if violations.is_empty() => Ok(NewBill {
                due_date: self.due_date,
                payment_date: self.payment_date,
                amount,
                description,
            }),
            _ => Err(ServiceError::Validation(violations)),
        }
    }
}

/// A bill that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub due_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub description: String,
}

impl NewBill {
    /// Column values with the status derived for `today`.
    pub fn into_fields(self, today: NaiveDate) -> BillFields {
        BillFields {
            status: derive_status(self.due_date, self.payment_date, today),
            due_date: self.due_date,
            payment_date: self.payment_date,
            amount: self.amount,
            description: self.description,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Unpaid bills due within `range` whose description equals `description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpaidFilter {
    pub range: DateRange,
    pub description: String,
}

/// Sum of paid amounts for one payment month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// `MM/YYYY`
    pub period: String,
    pub total_value: Decimal,
}
