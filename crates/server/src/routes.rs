use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::bill::{repository::BillRepository, BillService};

use crate::openapi::ApiDoc;

pub mod bills;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub bills: Arc<BillService<dyn BillRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn BillRepository>) -> Self {
        Self { bills: Arc::new(BillService::new(repo)) }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "OK", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json));

    let api = Router::new()
        .route("/api/bills", get(bills::list).post(bills::create))
        .route("/api/bills/unpaid", get(bills::list_unpaid))
        .route("/api/bills/paid-totals", get(bills::paid_totals))
        .route("/api/bills/import-csv", post(bills::import_csv))
        .route("/api/bills/:id", get(bills::get).put(bills::replace).delete(bills::delete))
        .route("/api/bills/:id/status", put(bills::set_status))
        .with_state(state);

    public
        .merge(api)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
