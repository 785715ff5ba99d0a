use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use agrobase_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backend, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn producer_body() -> serde_json::Value {
    json!({
        "tax_id": "86559160000190",
        "owner_name": "John Smith",
        "city": "Ibirama",
        "state_code": "SC",
        "farm_name": "Smith Farm",
        "total_area_ha": 20,
        "arable_area_ha": 5.5,
        "vegetation_area_ha": 9.99,
        "crops": ["corn", "soy"],
    })
}

async fn create_producer(
    client: &reqwest::Client,
    base_url: &str,
    body: &serde_json::Value,
) -> serde_json::Value {
    let res = client
        .post(format!("{base_url}/producers"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_returns_created_record() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = create_producer(&client, &srv.base_url, &producer_body()).await;

    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["tax_id"], "86559160000190");
    assert_eq!(body["owner_name"], "John Smith");
    assert_eq!(body["total_area_ha"], "20.00");
    assert_eq!(body["arable_area_ha"], "5.50");
    assert_eq!(body["vegetation_area_ha"], "9.99");
    assert_eq!(body["crops"], json!(["corn", "soy"]));
    assert_eq!(body["deleted"], false);

    let res = client
        .get(format!("{}/producers/{}", srv.base_url, body["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn create_normalizes_formatted_tax_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = producer_body();
    body["tax_id"] = json!("86.559.160/0001-90");
    let created = create_producer(&client, &srv.base_url, &body).await;
    assert_eq!(created["tax_id"], "86559160000190");
}

#[tokio::test]
async fn create_rejects_invalid_cpf() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = producer_body();
    body["tax_id"] = json!("11122233344");
    let res = client
        .post(format!("{}/producers", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_document");
    assert_eq!(err["message"], "CPF 111.222.333-44 is not a valid document");
}

#[tokio::test]
async fn create_rejects_duplicate_document() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_producer(&client, &srv.base_url, &producer_body()).await;

    let res = client
        .post(format!("{}/producers", srv.base_url))
        .json(&producer_body())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "duplicate_document");
    assert_eq!(err["message"], "CNPJ 86.559.160/0001-90 is already registered");
}

#[tokio::test]
async fn create_rejects_area_violation() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // 5.5 + 9.99 = 15.49 > 10.
    let mut body = producer_body();
    body["total_area_ha"] = json!(10);
    let res = client
        .post(format!("{}/producers", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "area_exceeded");
}

#[tokio::test]
async fn create_rejects_unknown_crops_with_accepted_options() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = producer_body();
    body["crops"] = json!(["corn", "mango"]);
    let res = client
        .post(format!("{}/producers", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
    assert_eq!(
        err["message"],
        "crops accepts: soy, corn, cotton, coffee, sugarcane"
    );
}

#[tokio::test]
async fn create_reports_all_missing_fields_at_once() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/producers", srv.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
    let message = err["message"].as_str().unwrap();
    assert!(message.contains("tax_id is required"));
    assert!(message.contains("crops is required"));
}

#[tokio::test]
async fn list_paginates_and_reports_total() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for tax_id in ["86559160000190", "25964013040", "12345678909"] {
        let mut body = producer_body();
        body["tax_id"] = json!(tax_id);
        create_producer(&client, &srv.base_url, &body).await;
    }

    let res = client
        .get(format!("{}/producers?limit=2", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 3);

    let res = client
        .get(format!("{}/producers?limit=2&skip=2", srv.base_url))
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    // An explicit limit of zero yields zero rows while total still counts.
    let res = client
        .get(format!("{}/producers?limit=0", srv.base_url))
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert!(page["items"].as_array().unwrap().is_empty());
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn list_filters_by_state() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_producer(&client, &srv.base_url, &producer_body()).await;
    let mut other = producer_body();
    other["tax_id"] = json!("25964013040");
    other["state_code"] = json!("GO");
    create_producer(&client, &srv.base_url, &other).await;

    let res = client
        .get(format!("{}/producers?state_code=GO", srv.base_url))
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["state_code"], "GO");
}

#[tokio::test]
async fn get_with_malformed_id_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/producers/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_id");
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/producers/00000000-0000-7000-8000-000000000000",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "not_found");
}

#[tokio::test]
async fn update_applies_partial_changes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create_producer(&client, &srv.base_url, &producer_body()).await;
    let id = created["id"].as_str().unwrap();

    let res = client
        .patch(format!("{}/producers/{id}", srv.base_url))
        .json(&json!({"owner_name": "Jane Smith", "arable_area_ha": 1.25}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["owner_name"], "Jane Smith");
    assert_eq!(updated["arable_area_ha"], "1.25");
    // Untouched fields survive.
    assert_eq!(updated["total_area_ha"], "20.00");
    assert_eq!(updated["vegetation_area_ha"], "9.99");
    assert_eq!(updated["tax_id"], "86559160000190");
}

#[tokio::test]
async fn update_rechecks_area_invariant_against_merged_record() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create_producer(&client, &srv.base_url, &producer_body()).await;
    let id = created["id"].as_str().unwrap();

    // Existing arable 5.5 + vegetation 9.99 no longer fit under total 10.
    let res = client
        .patch(format!("{}/producers/{id}", srv.base_url))
        .json(&json!({"total_area_ha": 10}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "area_exceeded");

    // The failed update persisted nothing.
    let res = client
        .get(format!("{}/producers/{id}", srv.base_url))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["total_area_ha"], "20.00");
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .patch(format!(
            "{}/producers/00000000-0000-7000-8000-000000000000",
            srv.base_url
        ))
        .json(&json!({"owner_name": "Jane Smith"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_soft_deletes_and_frees_the_document() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create_producer(&client, &srv.base_url, &producer_body()).await;
    let id = created["id"].as_str().unwrap();

    let res = client
        .delete(format!("{}/producers/{id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/producers/{id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The same document registers again once its holder is soft-deleted.
    create_producer(&client, &srv.base_url, &producer_body()).await;
}

#[tokio::test]
async fn dashboard_reports_aggregates_over_live_records() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_producer(&client, &srv.base_url, &producer_body()).await;

    let mut second = producer_body();
    second["tax_id"] = json!("11222333000181");
    second["state_code"] = json!("GO");
    second["total_area_ha"] = json!(30);
    second["arable_area_ha"] = json!(10);
    second["vegetation_area_ha"] = json!(4.01);
    second["crops"] = json!(["soy", "coffee"]);
    create_producer(&client, &srv.base_url, &second).await;

    let mut gone = producer_body();
    gone["tax_id"] = json!("25964013040");
    let gone = create_producer(&client, &srv.base_url, &gone).await;
    client
        .delete(format!(
            "{}/producers/{}",
            srv.base_url,
            gone["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/producers/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary: serde_json::Value = res.json().await.unwrap();

    assert_eq!(summary["total_farm_count"], 2);
    assert_eq!(summary["total_area_ha"], "50.00");
    assert_eq!(
        summary["farms_by_state"],
        json!([
            {"state_code": "GO", "count": 1},
            {"state_code": "SC", "count": 1},
        ])
    );
    // A record with N crops contributes to N crop groups.
    assert_eq!(
        summary["farms_by_crop"],
        json!([
            {"crop": "coffee", "count": 1},
            {"crop": "corn", "count": 1},
            {"crop": "soy", "count": 2},
        ])
    );
    assert_eq!(summary["land_use"]["total_arable_ha"], "15.50");
    assert_eq!(summary["land_use"]["total_vegetation_ha"], "14.00");
}
