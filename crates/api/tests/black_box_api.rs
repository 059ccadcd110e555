use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};

use warehouse_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over a fresh in-memory store, on an ephemeral port.
        let app = build_app(AppServices::in_memory(), Duration::from_secs(5));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/v1", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn seed(client: &reqwest::Client, srv: &TestServer) {
    let res = client
        .post(srv.url("/inventory"))
        .json(&json!({ "inventory": [
            { "art_id": "1", "name": "leg", "stock": "12" },
            { "art_id": "2", "name": "screw", "stock": 17 },
            { "art_id": "3", "name": "seat", "stock": "2" },
            { "art_id": "4", "name": "table top", "stock": "1" }
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "4 item inserted");

    let res = client
        .post(srv.url("/product"))
        .json(&json!({ "products": [
            { "name": "Dining Chair", "contain_articles": [
                { "art_id": "1", "amount_of": "4" },
                { "art_id": "2", "amount_of": "8" },
                { "art_id": "3", "amount_of": 1 }
            ]},
            { "name": "Dinning Table", "contain_articles": [
                { "art_id": "1", "amount_of": "4" },
                { "art_id": "2", "amount_of": "8" },
                { "art_id": "4", "amount_of": "1" }
            ]}
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "2 product inserted");
}

#[tokio::test]
async fn health_reports_healthy_and_echoes_request_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/health"))
        .header("x-request-id", "rid-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "rid-42");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "healthy endpoint");

    let res = client.get(srv.url("/health")).send().await.unwrap();
    let minted = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&minted).is_ok());
}

#[tokio::test]
async fn empty_store_has_no_product_in_stock() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(srv.url("/product"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "No product in stock");

    let body: Value = client
        .get(srv.url("/inventory"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["inventory"], json!([]));
}

#[tokio::test]
async fn sell_lifecycle_updates_stock_and_availability() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed(&client, &srv).await;

    let body: Value = client
        .get(srv.url("/product"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["product_stocks"],
        json!([
            { "product_name": "Dining Chair", "stock_of_product": "2" },
            { "product_name": "Dinning Table", "stock_of_product": "1" }
        ])
    );

    let res = client
        .post(srv.url("/product/Dinning%20Table"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Product Dinning Table is sold and inventory is updated accordingly"
    );

    let body: Value = client
        .get(srv.url("/inventory"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["inventory"],
        json!([
            { "art_id": "1", "name": "leg", "stock": "8" },
            { "art_id": "2", "name": "screw", "stock": "9" },
            { "art_id": "3", "name": "seat", "stock": "2" },
            { "art_id": "4", "name": "table top", "stock": "0" }
        ])
    );

    // Table top is gone: the table drops out; 9 screws leave one chair.
    let body: Value = client
        .get(srv.url("/product"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["product_stocks"],
        json!([{ "product_name": "Dining Chair", "stock_of_product": "1" }])
    );

    let res = client
        .post(srv.url("/product/Dinning%20Table"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], 409);
    assert_eq!(body["errors"], "out_of_stock");
    assert_eq!(body["message"], "this product is not in stock, cannot be sold");
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed(&client, &srv).await;

    let res = client.post(srv.url("/product/Sofa")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"], "not_found");
    assert_eq!(body["message"], "this product is not in system, cannot be sold");
}

#[tokio::test]
async fn invalid_uploads_are_rejected_without_side_effects() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/inventory"))
        .header("content-type", "application/json")
        .body("{\"inventory\": [")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/inventory"))
        .json(&json!({ "inventory": [
            { "art_id": "1", "name": "leg", "stock": "12" },
            { "art_id": "2", "name": "screw", "stock": "-1" }
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"], "validation_error");

    let body: Value = client
        .get(srv.url("/inventory"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["inventory"], json!([]));

    seed(&client, &srv).await;
    let res = client
        .post(srv.url("/product"))
        .json(&json!({ "products": [{ "name": "Empty", "contain_articles": [] }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Products referencing articles that do not exist are a storage rejection.
    let res = client
        .post(srv.url("/product"))
        .json(&json!({ "products": [{ "name": "Lamp", "contain_articles": [
            { "art_id": "99", "amount_of": "1" }
        ]}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"], "persistence_error");
}
