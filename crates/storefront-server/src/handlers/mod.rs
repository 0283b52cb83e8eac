//! HTTP handlers, one module per resource.

pub mod cache;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod order;
pub mod payment;
pub mod product;
pub mod response;
pub mod review;
pub mod user;

pub use response::ApiResponse;
