//! Application fixtures backed by in-memory stores.

use std::sync::Arc;

use chrono::Utc;
use storefront_core::{Gender, NewUser, Role, User};
use storefront_server::{
    AppState,
    cache::MemoryKeyStore,
    create_router,
    metrics::detached_handle,
    payments::SandboxGateway,
};
use storefront_store::{DocumentStore, MemoryObjectStore, MemoryStore};

use super::client::{Part, TestClient};

pub const ADMIN_ID: &str = "admin-1";
pub const CUSTOMER_ID: &str = "user-1";

/// A router plus handles onto the stores behind it.
pub struct TestApp {
    pub client: TestClient,
    pub state: AppState,
    pub key_store: Arc<MemoryKeyStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn admin(&self) -> TestClient {
        self.client.as_user(ADMIN_ID)
    }

    pub fn customer(&self) -> TestClient {
        self.client.as_user(CUSTOMER_ID)
    }

    /// True if the key is currently cached.
    pub fn cached(&self, key: &str) -> bool {
        self.key_store.contains_key(key)
    }

    /// Creates a product through the API and returns its id.
    pub async fn create_product(&self, name: &str, price: f64, stock: u32, category: &str) -> String {
        let response = self
            .admin()
            .multipart(
                axum::http::Method::POST,
                "/api/v1/product/new",
                new_product_parts(name, price, stock, category),
            )
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()["product"]["_id"]
            .as_str()
            .expect("product id")
            .to_string()
    }
}

fn user(id: &str, name: &str, gender: Gender, role: Role) -> User {
    let mut user = NewUser {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        email: Some(format!("{id}@example.com")),
        photo: Some(format!("https://img.example.com/{id}.png")),
        gender: Some(gender),
        dob: Some("1995-04-12".to_string()),
    }
    .into_user(Utc::now())
    .expect("valid user");
    user.role = role;
    user
}

/// Fresh app with one admin and one customer.
pub async fn test_app() -> TestApp {
    test_app_with_documents(Arc::new(MemoryStore::new())).await
}

/// Like [`test_app`], over a caller-supplied document store.
pub async fn test_app_with_documents(documents: Arc<dyn DocumentStore>) -> TestApp {
    let key_store = Arc::new(MemoryKeyStore::new(1_000));
    let objects = Arc::new(MemoryObjectStore::new());

    let state = AppState::new(
        documents,
        objects.clone(),
        key_store.clone(),
        Arc::new(SandboxGateway),
    );

    state
        .users()
        .insert(&user(ADMIN_ID, "Ada Admin", Gender::Female, Role::Admin))
        .await
        .unwrap();
    state
        .users()
        .insert(&user(CUSTOMER_ID, "Chris Customer", Gender::Male, Role::User))
        .await
        .unwrap();

    let client = TestClient::new(create_router(state.clone(), detached_handle()));

    TestApp {
        client,
        state,
        key_store,
        objects,
    }
}

/// A complete product form with one photo.
pub fn new_product_parts(name: &str, price: f64, stock: u32, category: &str) -> Vec<Part> {
    vec![
        Part::text("name", name),
        Part::text("price", price),
        Part::text("stock", stock),
        Part::text("category", category),
        Part::text("description", format!("{name} description")),
        Part::photo("front.png"),
    ]
}
