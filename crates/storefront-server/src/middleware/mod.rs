//! Tower middleware applied to every request:
//! - `RequestIdLayer`: propagates or mints `x-request-id`
//! - `LoggingLayer`: one span per request with method, path and caller

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
