mod common;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use grading_service::config::StoreBackend;
use grading_service::models::{Student, StudentChanges, Subject};
use grading_service::services::{
    MemoryStore, Store, StoreError, StudentStore, SubjectStore, Upserted,
};
use grading_service::startup::{build_router, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;

/// A store whose every call fails, as if the connection had dropped.
struct UnreachableStore;

fn unreachable() -> StoreError {
    StoreError::Backend(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl StudentStore for UnreachableStore {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Err(unreachable())
    }

    async fn upsert_student(&self, _: Student) -> Result<Upserted<Student>, StoreError> {
        Err(unreachable())
    }

    async fn update_student(
        &self,
        _: i64,
        _: StudentChanges,
    ) -> Result<Option<Student>, StoreError> {
        Err(unreachable())
    }

    async fn delete_student(&self, _: i64) -> Result<(), StoreError> {
        Err(unreachable())
    }
}

#[async_trait]
impl SubjectStore for UnreachableStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        Err(unreachable())
    }

    async fn create_subject(&self, _: Subject) -> Result<Subject, StoreError> {
        Err(unreachable())
    }

    async fn delete_subject(&self, _: &str) -> Result<(), StoreError> {
        Err(unreachable())
    }
}

#[async_trait]
impl Store for UnreachableStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Err(unreachable())
    }
}

fn router_with(store: Arc<dyn Store>) -> Router {
    build_router(AppState {
        config: common::test_config(StoreBackend::Memory),
        store,
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn store_failures_surface_as_500_with_raw_message() {
    let store: Arc<dyn Store> = Arc::new(UnreachableStore);

    let cases = [
        ("GET", "/students", None),
        (
            "POST",
            "/students",
            Some(r#"{"rollNo":1,"studentName":"A","marks":{}}"#),
        ),
        ("PUT", "/students/1", Some(r#"{"studentName":"A"}"#)),
        ("DELETE", "/students/1", None),
        ("GET", "/subjects", None),
        ("POST", "/subjects", Some(r#"{"name":"Math"}"#)),
        ("DELETE", "/subjects/Math", None),
    ];

    for (method, uri, body) in cases {
        let (status, value) = send(router_with(store.clone()), method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(value["error"], "connection refused", "{} {}", method, uri);
    }
}

#[tokio::test]
async fn health_reports_unhealthy_store() {
    let (status, value) = send(router_with(Arc::new(UnreachableStore)), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(value["status"], "unhealthy");
}

#[tokio::test]
async fn malformed_json_body_on_students_is_500() {
    let app = router_with(Arc::new(MemoryStore::new()));

    let (status, value) = send(app, "POST", "/students", Some("{not json")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let app = router_with(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/students")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "PUT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let app = router_with(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
