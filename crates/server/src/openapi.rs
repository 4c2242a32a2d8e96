use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

/// Dates are `YYYY-MM-DD`; amounts are decimal strings or numbers.
#[derive(ToSchema)]
pub struct BillInputDoc {
    #[schema(example = "2024-06-01")]
    pub due_date: String,
    #[schema(example = "2024-05-20")]
    pub payment_date: Option<String>,
    #[schema(example = "150.00")]
    pub amount: String,
    #[schema(example = "Rent")]
    pub description: String,
}

#[derive(ToSchema)]
pub struct BillDoc {
    pub id: i64,
    pub due_date: Option<String>,
    pub payment_date: Option<String>,
    pub amount: String,
    pub description: String,
    /// PENDING, OVERDUE or PAID
    pub status: String,
}

#[derive(ToSchema)]
pub struct StatusUpdateDoc { pub paid: bool }

#[derive(ToSchema)]
pub struct CreatedDoc { pub id: i64 }

#[derive(ToSchema)]
pub struct PeriodTotalDoc {
    #[schema(example = "05/2024")]
    pub period: String,
    pub total_value: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::bills::create,
        crate::routes::bills::replace,
        crate::routes::bills::set_status,
        crate::routes::bills::get,
        crate::routes::bills::list,
        crate::routes::bills::list_unpaid,
        crate::routes::bills::paid_totals,
        crate::routes::bills::delete,
        crate::routes::bills::import_csv,
    ),
    components(
        schemas(
            HealthResponse,
            BillInputDoc,
            BillDoc,
            StatusUpdateDoc,
            CreatedDoc,
            PeriodTotalDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "bills")
    )
)]
pub struct ApiDoc;
