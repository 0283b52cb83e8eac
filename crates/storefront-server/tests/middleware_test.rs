//! Middleware tests.

mod helpers;

use helpers::test_app;
use uuid::Uuid;

#[tokio::test]
async fn response_includes_request_id() {
    let app = test_app().await;

    app.client
        .get("/health")
        .await
        .assert_header_exists("x-request-id");
}

#[tokio::test]
async fn minted_request_id_is_uuid_v7() {
    let app = test_app().await;
    let response = app.client.get("/health").await;

    let id = response.header("x-request-id").unwrap();
    let parsed = Uuid::parse_str(id).unwrap();

    assert_eq!(parsed.get_version_num(), 7);
}

#[tokio::test]
async fn propagates_incoming_request_id() {
    let app = test_app().await;
    let custom_id = "my-custom-request-id-12345";

    app.client
        .get_with_headers("/health", vec![("x-request-id", custom_id)])
        .await
        .assert_header("x-request-id", custom_id);
}

#[tokio::test]
async fn generates_different_ids_for_each_request() {
    let app = test_app().await;

    let first = app.client.get("/health").await;
    let second = app.client.get("/health").await;

    assert_ne!(
        first.header("x-request-id").unwrap(),
        second.header("x-request-id").unwrap()
    );
}

#[tokio::test]
async fn request_id_present_on_errors() {
    let app = test_app().await;

    let response = app.client.get("/api/v1/product/missing").await;
    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = test_app().await;

    let response = app
        .client
        .get_with_headers("/health", vec![("origin", "http://localhost:5173")])
        .await;

    response.assert_header("access-control-allow-origin", "*");
}
