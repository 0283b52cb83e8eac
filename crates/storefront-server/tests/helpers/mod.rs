//! Test helpers for storefront-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod failing_store;
pub mod fixtures;

pub use client::{Part, TestClient, TestResponse};
pub use failing_store::{FailingWrites, Write};
pub use fixtures::{ADMIN_ID, CUSTOMER_ID, TestApp, new_product_parts, test_app, test_app_with_documents};
