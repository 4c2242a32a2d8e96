use rust_decimal::Decimal;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Statement,
};

use models::bill::{self, BillFields};

use crate::bill::domain::{Bill, DateRange, PeriodTotal, UnpaidFilter};
use crate::bill::repository::BillRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

const PAID_TOTALS_SQL: &str = r#"
SELECT to_char(payment_date, 'MM/YYYY') AS period, SUM(amount) AS total_value
FROM bill
WHERE payment_date IS NOT NULL AND payment_date BETWEEN $1 AND $2
GROUP BY date_trunc('month', payment_date), to_char(payment_date, 'MM/YYYY')
ORDER BY date_trunc('month', payment_date)
LIMIT $3 OFFSET $4
"#;

const PAID_TOTALS_COUNT_SQL: &str = r#"
SELECT COUNT(DISTINCT date_trunc('month', payment_date)) AS total
FROM bill
WHERE payment_date IS NOT NULL AND payment_date BETWEEN $1 AND $2
"#;

#[derive(Debug, FromQueryResult)]
struct PeriodTotalRow {
    period: String,
    total_value: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

pub struct SeaOrmBillRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmBillRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    fn ordered(select: Select<bill::Entity>) -> Select<bill::Entity> {
        select
            .order_by_with_nulls(bill::Column::DueDate, Order::Desc, NullOrdering::Last)
            .order_by_desc(bill::Column::Id)
    }

    async fn fetch_page(&self, select: Select<bill::Entity>, page: Pagination) -> Result<Page<Bill>, ServiceError> {
        let (index, size) = page.normalize();
        let paginator = Self::ordered(select).paginate(&self.db, size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(index).await?;
        Ok(Page::new(rows.into_iter().map(Bill::from).collect(), page, total))
    }
}

#[async_trait::async_trait]
impl BillRepository for SeaOrmBillRepository {
    async fn insert(&self, fields: BillFields) -> Result<Bill, ServiceError> {
        Ok(bill::insert(&self.db, fields).await?.into())
    }

    async fn update(&self, id: i64, fields: BillFields) -> Result<Bill, ServiceError> {
        Ok(bill::update(&self.db, id, fields).await?.into())
    }

    async fn find(&self, id: i64) -> Result<Option<Bill>, ServiceError> {
        let found = bill::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Bill::from))
    }

    async fn list(&self, page: Pagination) -> Result<Page<Bill>, ServiceError> {
        self.fetch_page(bill::Entity::find(), page).await
    }

    async fn list_unpaid(&self, filter: &UnpaidFilter, page: Pagination) -> Result<Page<Bill>, ServiceError> {
        let select = bill::Entity::find()
            .filter(bill::Column::DueDate.between(filter.range.start, filter.range.end))
            .filter(bill::Column::Description.eq(filter.description.clone()))
            .filter(bill::Column::PaymentDate.is_null());
        self.fetch_page(select, page).await
    }

    async fn paid_totals_per_month(&self, range: &DateRange, page: Pagination) -> Result<Page<PeriodTotal>, ServiceError> {
        let backend = self.db.get_database_backend();
        let (_, size) = page.normalize();
        let out_of_range = |_| ServiceError::Validation(vec!["page is out of range".into()]);
        let limit = i64::try_from(size).map_err(out_of_range)?;
        let offset = i64::try_from(page.offset()).map_err(out_of_range)?;

        let count = CountRow::find_by_statement(Statement::from_sql_and_values(
            backend,
            PAID_TOTALS_COUNT_SQL,
            [range.start.into(), range.end.into()],
        ))
        .one(&self.db)
        .await?
        .map(|r| r.total)
        .unwrap_or_default();

        let rows = PeriodTotalRow::find_by_statement(Statement::from_sql_and_values(
            backend,
            PAID_TOTALS_SQL,
            [
                range.start.into(),
                range.end.into(),
                limit.into(),
                offset.into(),
            ],
        ))
        .all(&self.db)
        .await?;

        let content = rows
            .into_iter()
            .map(|r| PeriodTotal { period: r.period, total_value: r.total_value })
            .collect();
        Ok(Page::new(content, page, u64::try_from(count).unwrap_or_default()))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = bill::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
