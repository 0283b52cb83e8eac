//! Test client helpers.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "storefront-test-boundary";

/// One part of a multipart form.
pub enum Part {
    Text(&'static str, String),
    File {
        name: &'static str,
        file_name: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: &'static str, value: impl ToString) -> Self {
        Self::Text(name, value.to_string())
    }

    pub fn photo(file_name: &str) -> Self {
        Self::File {
            name: "photos",
            file_name: file_name.to_string(),
            content_type: "image/png",
            bytes: b"\x89PNG fake image".to_vec(),
        }
    }
}

fn multipart_body(parts: Vec<Part>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Drives the router in-process, optionally as a given user.
#[derive(Clone)]
pub struct TestClient {
    app: Router,
    user: Option<String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, user: None }
    }

    /// A client sending `x-user-id: {id}` on every request.
    pub fn as_user(&self, id: &str) -> Self {
        Self {
            app: self.app.clone(),
            user: Some(id.to_string()),
        }
    }

    fn builder(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = &self.user {
            builder = builder.header("x-user-id", user);
        }
        builder
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(self.builder(Method::GET, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        let mut builder = self.builder(Method::GET, uri);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(self.builder(Method::DELETE, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::POST, uri, body).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::PUT, uri, body).await
    }

    pub async fn delete_json(&self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::DELETE, uri, body).await
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> TestResponse {
        let request = self
            .builder(method, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    pub async fn multipart(&self, method: Method, uri: &str, parts: Vec<Part>) -> TestResponse {
        let request = self
            .builder(method, uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.request(request).await
    }

    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Buffered response with assertion helpers.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }

    /// Asserts the error envelope and its message.
    pub fn assert_error(&self, status: StatusCode, message: &str) -> &Self {
        self.assert_status(status);
        let body = self.json();
        assert_eq!(body["success"], false, "Body: {body}");
        assert_eq!(body["message"], message, "Body: {body}");
        self
    }
}
