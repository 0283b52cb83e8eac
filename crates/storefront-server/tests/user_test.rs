mod helpers;

use axum::http::StatusCode;
use helpers::{ADMIN_ID, CUSTOMER_ID, test_app};
use serde_json::json;

fn registration(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": "Nia",
        "email": "nia@example.com",
        "photo": "https://img.example.com/nia.png",
        "gender": "female",
        "dob": "2001-09-30"
    })
}

#[tokio::test]
async fn registers_new_user() {
    let app = test_app().await;

    let response = app.client.post_json("/api/v1/user/new", registration("u-nia")).await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json()["message"], "Welcome, Nia");

    let response = app.client.get("/api/v1/user/u-nia").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json()["user"]["role"], "user");
}

#[tokio::test]
async fn existing_id_is_welcomed_back() {
    let app = test_app().await;

    let response = app
        .client
        .post_json("/api/v1/user/new", registration(CUSTOMER_ID))
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json()["message"], "Welcome back, Chris Customer");
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = test_app().await;

    app.client
        .post_json("/api/v1/user/new", json!({"_id": "u-2", "name": "Sam"}))
        .await
        .assert_error(StatusCode::BAD_REQUEST, "Please enter all fields");
}

#[tokio::test]
async fn listing_users_requires_admin() {
    let app = test_app().await;

    app.client
        .get("/api/v1/user/all")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.client
        .as_user("ghost")
        .get("/api/v1/user/all")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.customer()
        .get("/api/v1/user/all")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app.admin().get("/api/v1/user/all").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json()["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn registration_drops_dashboard_keys() {
    let app = test_app().await;

    app.admin()
        .get("/api/v1/dashboard/stats")
        .await
        .assert_status(StatusCode::OK);
    assert!(app.cached("admin-stats"));

    app.client
        .post_json("/api/v1/user/new", registration("u-new"))
        .await
        .assert_status(StatusCode::CREATED);

    assert!(!app.cached("admin-stats"));
}

#[tokio::test]
async fn admin_deletes_user() {
    let app = test_app().await;

    app.admin()
        .delete(&format!("/api/v1/user/{CUSTOMER_ID}"))
        .await
        .assert_status(StatusCode::OK);
    app.client
        .get(&format!("/api/v1/user/{CUSTOMER_ID}"))
        .await
        .assert_error(StatusCode::NOT_FOUND, "User not found");

    app.admin()
        .delete("/api/v1/user/nobody")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // The admin still exists
    app.client
        .get(&format!("/api/v1/user/{ADMIN_ID}"))
        .await
        .assert_status(StatusCode::OK);
}
