use chrono::{Local, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Payment state of a bill. Never set directly; see [`derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum BillStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    #[sea_orm(string_value = "PAID")]
    Paid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bill")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub due_date: Option<Date>,
    pub payment_date: Option<Date>,
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: BillStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Current local calendar date; the reference point for status derivation.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// PAID when a payment date is present; otherwise PENDING while the due date
/// is today or later, OVERDUE once it has passed.
///
/// An unpaid bill without a due date (only possible for a degraded CSV row)
/// is PENDING.
pub fn derive_status(due_date: Option<NaiveDate>, payment_date: Option<NaiveDate>, today: NaiveDate) -> BillStatus {
    if payment_date.is_some() {
        return BillStatus::Paid;
    }
    match due_date {
        Some(due) if due < today => BillStatus::Overdue,
        _ => BillStatus::Pending,
    }
}

pub fn validate_amount(amount: &Decimal) -> Result<(), ModelError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(ModelError::Validation("amount must be greater than zero".into()));
    }
    Ok(())
}

/// Column values written on insert and full replace.
#[derive(Clone, Debug, PartialEq)]
pub struct BillFields {
    pub due_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub description: String,
    pub status: BillStatus,
}

pub async fn insert(db: &DatabaseConnection, fields: BillFields) -> Result<Model, ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        due_date: Set(fields.due_date),
        payment_date: Set(fields.payment_date),
        amount: Set(fields.amount),
        description: Set(fields.description),
        status: Set(fields.status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn update(db: &DatabaseConnection, id: i64, fields: BillFields) -> Result<Model, ModelError> {
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound(id))?
        .into();
    am.due_date = Set(fields.due_date);
    am.payment_date = Set(fields.payment_date);
    am.amount = Set(fields.amount);
    am.description = Set(fields.description);
    am.status = Set(fields.status);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}
