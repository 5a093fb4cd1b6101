#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use taskboard_server::clock::{Clock, ManualClock};
use taskboard_server::item::ItemService;
use taskboard_server::item::api::v1::ItemState;
use taskboard_server::task::api::v1::TaskState;
use taskboard_server::task::{InMemoryTaskStore, TaskService};
use taskboard_server::web::{AppState, create_app};
use tower::ServiceExt;

/// Application under test, wired to a manual clock so timestamps are predictable.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
}

/// Status, content type and decoded JSON body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

/// HTTP response snapshot for testing endpoints.
///
/// Fields are declared in alphabetical order so the snapshot layout does not
/// depend on whether maps are sorted.
#[derive(Debug, Serialize)]
pub struct HttpResponseSnapshot {
    body: Value,
    content_type: Option<String>,
    status: u16,
    test_context: String,
}

impl HttpResponseSnapshot {
    /// Create a new HTTP response snapshot.
    pub fn new(response: &TestResponse, test_context: &str) -> Self {
        Self {
            body: response.body.clone(),
            content_type: response.content_type.clone(),
            status: response.status.as_u16(),
            test_context: test_context.to_string(),
        }
    }
}

impl TestApp {
    pub fn new() -> Self {
        // Allow multiple calls to init for tests.
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        ));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let state = AppState {
            tasks: Arc::new(TaskState::new(TaskService::new(
                Box::new(InMemoryTaskStore::new()),
                shared_clock.clone(),
            ))),
            items: Arc::new(ItemState::new(ItemService::with_sample_items(shared_clock))),
        };
        Self {
            router: create_app(state),
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            body,
        }
    }

    pub async fn request(&self, method: Method, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn request_json(&self, method: Method, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request_json(Method::POST, uri, body).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request_json(Method::PUT, uri, body).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request_json(Method::PATCH, uri, body).await
    }

    /// Creates a task and returns its JSON, failing the test if creation is rejected.
    pub async fn create_task(&self, body: Value) -> Value {
        let response = self.post("/api/tasks", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    /// Creates a task and returns its id.
    pub async fn create_task_id(&self, body: Value) -> u64 {
        self.create_task(body).await["id"].as_u64().unwrap()
    }
}
