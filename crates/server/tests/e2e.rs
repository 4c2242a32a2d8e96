use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chrono::{Duration, Local};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::bill::repository::mock::InMemoryBillRepository;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes::{self, ServerState};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    repo: Arc<InMemoryBillRepository>,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let repo = Arc::new(InMemoryBillRepository::default());
    let app: Router = routes::build_router(ServerState::new(repo.clone()), cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, repo })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn day(offset: i64) -> String {
    (Local::now().date_naive() + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

async fn create(app: &TestApp, body: Value) -> anyhow::Result<i64> {
    let res = client().post(format!("{}/api/bills", app.base_url)).json(&body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    Ok(created["id"].as_i64().unwrap())
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(body["paths"]["/api/bills/{id}/status"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_create_then_get() -> anyhow::Result<()> {
    let app = start_server().await?;
    let id = create(&app, json!({"due_date": day(5), "amount": "150.00", "description": "Rent"})).await?;

    let res = client().get(format!("{}/api/bills/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let bill = res.json::<Value>().await?;
    assert_eq!(bill["description"], "Rent");
    assert_eq!(bill["amount"], "150.00");
    assert_eq!(bill["status"], "PENDING");
    assert_eq!(bill["due_date"], day(5));
    assert!(bill["payment_date"].is_null());
    Ok(())
}

#[tokio::test]
async fn e2e_validation_errors_are_422() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(format!("{}/api/bills", app.base_url))
        .json(&json!({"amount": 0}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 3);
    assert!(violations.iter().all(|v| v["status_code"] == 422));
    assert!(violations.iter().any(|v| v["message"] == "amount must be greater than zero"));
    assert!(app.repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_body_and_id_are_400() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c
        .post(format!("{}/api/bills", app.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.get(format!("{}/api/bills/abc", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_id_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.get(format!("{}/api/bills/999", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c
        .put(format!("{}/api/bills/999", app.base_url))
        .json(&json!({"due_date": day(0), "amount": 1, "description": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c
        .put(format!("{}/api/bills/999/status", app.base_url))
        .json(&json!({"paid": true}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_replace_and_mark_paid() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create(&app, json!({"due_date": day(-3), "amount": 10, "description": "Water"})).await?;

    let res = c
        .put(format!("{}/api/bills/{}", app.base_url, id))
        .json(&json!({"due_date": day(-2), "amount": "12.50", "description": "Water bill"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let bill = res.json::<Value>().await?;
    assert_eq!(bill["status"], "OVERDUE");
    assert_eq!(bill["description"], "Water bill");

    let res = c
        .put(format!("{}/api/bills/{}/status", app.base_url, id))
        .json(&json!({"paid": true}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let bill = res.json::<Value>().await?;
    assert_eq!(bill["status"], "PAID");
    assert_eq!(bill["payment_date"], day(0));
    Ok(())
}

#[tokio::test]
async fn e2e_list_pages_by_due_date() -> anyhow::Result<()> {
    let app = start_server().await?;
    for offset in [1, 9, -4] {
        create(&app, json!({"due_date": day(offset), "amount": 1, "description": "x"})).await?;
    }
    let res = client().get(format!("{}/api/bills?page=0&size=2", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["total_elements"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["content"][0]["due_date"], day(9));
    assert_eq!(page["content"][1]["due_date"], day(1));
    Ok(())
}

#[tokio::test]
async fn e2e_unpaid_filter_and_paid_totals() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&app, json!({"due_date": "2024-06-05", "amount": 100, "description": "Rent"})).await?;
    create(&app, json!({"due_date": "2024-06-05", "amount": 40, "description": "Gas"})).await?;
    create(&app, json!({"due_date": "2024-06-01", "payment_date": "2024-05-20", "amount": "150.00", "description": "Rent"})).await?;
    create(&app, json!({"due_date": "2024-06-01", "payment_date": "2024-05-02", "amount": "49.50", "description": "Power"})).await?;

    let res = c
        .get(format!("{}/api/bills/unpaid?start_date=2024-06-01&end_date=2024-06-30&description=Rent", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["total_elements"], 1);
    assert_eq!(page["content"][0]["amount"], "100");

    let res = c
        .get(format!("{}/api/bills/paid-totals?start_date=2024-01-01&end_date=2024-12-31", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["content"], json!([{"period": "05/2024", "total_value": "199.50"}]));

    let res = c.get(format!("{}/api/bills/unpaid?start_date=2024-06-01", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_delete_is_always_204() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create(&app, json!({"due_date": day(0), "amount": 1, "description": "x"})).await?;
    for target in [id, id, 4242] {
        let res = c.delete(format!("{}/api/bills/{}", app.base_url, target)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    }
    assert!(app.repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_import_csv() -> anyhow::Result<()> {
    let app = start_server().await?;
    let csv = "Rent,150.00,2024-06-01,2024-05-20\nWater,abc,2024-06-01,\n";
    let part = reqwest::multipart::Part::bytes(csv.as_bytes().to_vec()).file_name("bills.csv");
    let form = reqwest::multipart::Form::new().part("file", part);
    let res = client().post(format!("{}/api/bills/import-csv", app.base_url)).multipart(form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(app.repo.len(), 2);

    let bill = client().get(format!("{}/api/bills/1", app.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(bill["status"], "PAID");
    assert_eq!(bill["payment_date"], "2024-05-20");
    Ok(())
}

#[tokio::test]
async fn e2e_import_empty_csv_is_400() -> anyhow::Result<()> {
    let app = start_server().await?;
    let part = reqwest::multipart::Part::bytes(Vec::new()).file_name("empty.csv");
    let form = reqwest::multipart::Form::new().part("file", part);
    let res = client().post(format!("{}/api/bills/import-csv", app.base_url)).multipart(form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(app.repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_import_without_multipart_is_json_400() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(format!("{}/api/bills/import-csv", app.base_url))
        .header("content-type", "text/csv")
        .body("Rent,150.00,2024-06-01,\n")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["status_code"], 400);
    assert!(body["details"].is_string());
    assert!(app.repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_huge_page_is_empty_not_an_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    create(&app, json!({"due_date": day(0), "amount": 1, "description": "x"})).await?;
    let res = client()
        .get(format!("{}/api/bills?page=1844674407370955161&size=10", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["content"], json!([]));
    assert_eq!(page["total_elements"], 1);
    Ok(())
}

#[tokio::test]
async fn e2e_serve_returns_after_shutdown_signal() -> anyhow::Result<()> {
    let repo = Arc::new(InMemoryBillRepository::default());
    let app: Router = routes::build_router(ServerState::new(repo), cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server::startup::serve(listener, app, async move {
        let _ = stop_rx.await;
    }));

    let res = client().get(format!("{}/health", base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    drop(res);

    stop_tx.send(()).ok();
    let served = handle.await?;
    assert!(served.is_ok());

    // listener is closed after shutdown
    assert!(client().get(format!("{}/health", base_url)).send().await.is_err());
    Ok(())
}
