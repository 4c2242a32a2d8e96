use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use service::bill::domain::{Bill, BillInput, DateRange, PeriodTotal, UnpaidFilter};
use service::pagination::{Page, Pagination, DEFAULT_PAGE_SIZE};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// Multipart field that carries the CSV file.
pub const CSV_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UnpaidQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PaidTotalsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub paid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedOutput {
    pub id: i64,
}

fn pagination(page: Option<u64>, size: Option<u64>) -> Pagination {
    Pagination::new(page.unwrap_or(0), size.unwrap_or(DEFAULT_PAGE_SIZE))
}

#[utoipa::path(
    post, path = "/api/bills", tag = "bills",
    request_body = crate::openapi::BillInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CreatedDoc),
        (status = 400, description = "Malformed body"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<BillInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedOutput>), JsonApiError> {
    let Json(input) = body?;
    let bill = state.bills.create(input).await?;
    info!(id = bill.id, "created bill");
    Ok((StatusCode::CREATED, Json(CreatedOutput { id: bill.id })))
}

#[utoipa::path(
    put, path = "/api/bills/{id}", tag = "bills",
    params(("id" = i64, Path, description = "Bill ID")),
    request_body = crate::openapi::BillInputDoc,
    responses(
        (status = 200, description = "Replaced", body = crate::openapi::BillDoc),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn replace(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<BillInput>, JsonRejection>,
) -> Result<Json<Bill>, JsonApiError> {
    let Path(id) = id?;
    let Json(input) = body?;
    let bill = state.bills.replace(id, input).await?;
    info!(id, "replaced bill");
    Ok(Json(bill))
}

#[utoipa::path(
    put, path = "/api/bills/{id}/status", tag = "bills",
    params(("id" = i64, Path, description = "Bill ID")),
    request_body = crate::openapi::StatusUpdateDoc,
    responses(
        (status = 200, description = "Status updated", body = crate::openapi::BillDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn set_status(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Bill>, JsonApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    let bill = state.bills.set_paid(id, update.paid).await?;
    info!(id, status = ?bill.status, "updated bill status");
    Ok(Json(bill))
}

#[utoipa::path(
    get, path = "/api/bills/{id}", tag = "bills",
    params(("id" = i64, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::BillDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Bill>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(state.bills.get(id).await?))
}

#[utoipa::path(
    get, path = "/api/bills", tag = "bills",
    params(
        ("page" = Option<u64>, Query, description = "0-based page index"),
        ("size" = Option<u64>, Query, description = "Page size, 1..=100")
    ),
    responses((status = 200, description = "Page of bills"))
)]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<Bill>>, JsonApiError> {
    let Query(q) = query?;
    let page = state.bills.list(pagination(q.page, q.size)).await?;
    info!(count = page.content.len(), total = page.total_elements, "list bills");
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/bills/unpaid", tag = "bills",
    params(
        ("start_date" = String, Query, description = "First due date, YYYY-MM-DD"),
        ("end_date" = String, Query, description = "Last due date, YYYY-MM-DD"),
        ("description" = String, Query, description = "Exact description"),
        ("page" = Option<u64>, Query, description = "0-based page index"),
        ("size" = Option<u64>, Query, description = "Page size, 1..=100")
    ),
    responses(
        (status = 200, description = "Page of unpaid bills"),
        (status = 400, description = "Missing or invalid parameters")
    )
)]
pub async fn list_unpaid(
    State(state): State<ServerState>,
    query: Result<Query<UnpaidQuery>, QueryRejection>,
) -> Result<Json<Page<Bill>>, JsonApiError> {
    let Query(q) = query?;
    let filter = UnpaidFilter {
        range: DateRange { start: q.start_date, end: q.end_date },
        description: q.description,
    };
    let page = state.bills.list_unpaid(filter, pagination(q.page, q.size)).await?;
    info!(count = page.content.len(), total = page.total_elements, "list unpaid bills");
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/bills/paid-totals", tag = "bills",
    params(
        ("start_date" = String, Query, description = "First payment date, YYYY-MM-DD"),
        ("end_date" = String, Query, description = "Last payment date, YYYY-MM-DD"),
        ("page" = Option<u64>, Query, description = "0-based page index"),
        ("size" = Option<u64>, Query, description = "Page size, 1..=100")
    ),
    responses(
        (status = 200, description = "Page of monthly totals"),
        (status = 400, description = "Missing or invalid parameters")
    )
)]
pub async fn paid_totals(
    State(state): State<ServerState>,
    query: Result<Query<PaidTotalsQuery>, QueryRejection>,
) -> Result<Json<Page<PeriodTotal>>, JsonApiError> {
    let Query(q) = query?;
    let page = state
        .bills
        .paid_totals_per_month(q.start_date, q.end_date, pagination(q.page, q.size))
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    delete, path = "/api/bills/{id}", tag = "bills",
    params(("id" = i64, Path, description = "Bill ID")),
    responses((status = 204, description = "Deleted or already absent"))
)]
pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    state.bills.delete(id).await?;
    info!(id, "deleted bill");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/api/bills/import-csv", tag = "bills",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV in field `file`: description,amount,due_date,payment_date"),
    responses(
        (status = 204, description = "Imported"),
        (status = 400, description = "Empty or missing file")
    )
)]
pub async fn import_csv(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, JsonApiError> {
    let mut multipart = multipart?;
    let mut data = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(CSV_FIELD) {
            data = Some(field.bytes().await?);
            break;
        }
    }
    let data = match data {
        Some(d) if !d.is_empty() => d,
        Some(_) => return Err(JsonApiError::bad_request("uploaded file is empty")),
        None => return Err(JsonApiError::bad_request(format!("multipart field `{CSV_FIELD}` is missing"))),
    };

    let report = state.bills.import_csv(&data).await?;
    if report.warnings > 0 {
        warn!(imported = report.imported, warnings = report.warnings, "csv imported with degraded fields");
    } else {
        info!(imported = report.imported, "csv imported");
    }
    Ok(StatusCode::NO_CONTENT)
}
