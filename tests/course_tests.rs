//! Course CRUD and PDF attachment storage.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codestack::api::AppState;
use codestack::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

struct TestApp {
    router: Router,
    attachments: PathBuf,
    token: String,
    _state: Arc<AppState>,
}

async fn spawn_app() -> TestApp {
    let id = uuid::Uuid::new_v4();
    let tmp = std::env::temp_dir();
    let attachments = tmp.join(format!("codestack-course-test-{id}-data"));

    let mut config = Config::default();
    config.general.database_path = format!(
        "sqlite:{}",
        tmp.join(format!("codestack-course-test-{id}.db")).display()
    );
    config.storage.attachments_path = attachments.display().to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = codestack::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = codestack::api::router(state.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/people",
            None,
            &json!({"email": "teacher@example.com", "password": "pw", "full_name": "Teacher", "role": "TEACHER"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth",
            None,
            &json!({"email": "teacher@example.com", "password": "pw"}),
        ))
        .await
        .unwrap();
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    TestApp {
        router,
        attachments,
        token,
        _state: state,
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn data_url(bytes: &[u8]) -> String {
    format!("data:application/pdf;base64,{}", STANDARD.encode(bytes))
}

impl TestApp {
    async fn create_course(&self, body: &Value) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(json_request("POST", "/courses", Some(&self.token), body))
            .await
            .unwrap()
    }

    async fn send(&self, method: &str, uri: &str, body: Option<&Value>) -> axum::response::Response {
        let request = match body {
            Some(body) => json_request(method, uri, Some(&self.token), body),
            None => bare_request(method, uri, &self.token),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

fn location_id(response: &axum::response::Response, prefix: &str) -> i32 {
    response.headers()["location"]
        .to_str()
        .unwrap()
        .trim_start_matches(prefix)
        .parse()
        .unwrap()
}

#[tokio::test]
async fn attachment_round_trips_through_open() {
    let app = spawn_app().await;

    let response = app
        .create_course(&json!({
            "name": "Go",
            "description": "Intro",
            "teacher": "Teacher",
            "teacher_id": "1",
            "file_name": "go.pdf",
            "file_body": data_url(PDF_BYTES),
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = location_id(&response, "/courses/");

    assert_eq!(
        std::fs::read(app.attachments.join(format!("{id}.pdf"))).unwrap(),
        PDF_BYTES
    );

    let response = app.send("GET", &format!("/courses/{id}/open"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let encoded = body_json(response).await;
    assert_eq!(encoded.as_str().unwrap(), STANDARD.encode(PDF_BYTES));

    let response = app.send("GET", &format!("/courses/{id}"), None).await;
    let course = body_json(response).await;
    assert_eq!(course["name"], "Go");
    assert_eq!(course["file_name"], "go.pdf");
    assert_eq!(course["teacher_id"], 1);
    assert_eq!(course["status"], "UNDEFINED");
    assert!(!course["created_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_attachment_is_rejected_before_insert() {
    let app = spawn_app().await;

    let response = app
        .create_course(&json!({
            "name": "Broken",
            "file_name": "broken.pdf",
            "file_body": "data:application/pdf;base64,@@not base64@@",
        }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "invalid attachment encoding");

    let response = app.send("GET", "/courses", None).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn course_requires_a_name() {
    let app = spawn_app().await;

    let response = app
        .create_course(&json!({"name": "  ", "description": "nameless"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_attachment_write_rolls_back_the_course() {
    let app = spawn_app().await;

    std::fs::remove_dir_all(&app.attachments).unwrap();
    std::fs::write(&app.attachments, b"not a directory").unwrap();

    let response = app
        .create_course(&json!({
            "name": "Doomed",
            "file_name": "doomed.pdf",
            "file_body": data_url(PDF_BYTES),
        }))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(body["message"], "attachment storage failed");

    let response = app.send("GET", "/courses", None).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn update_replaces_fields_and_attachment() {
    let app = spawn_app().await;

    let response = app
        .create_course(&json!({"name": "Old", "file_name": "a.pdf", "file_body": data_url(b"first")}))
        .await;
    let id = location_id(&response, "/courses/");

    let response = app
        .send(
            "PATCH",
            &format!("/courses/{id}"),
            Some(&json!({"name": "New", "file_name": "b.pdf", "file_body": data_url(b"second")})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let course = body_json(response).await;
    assert_eq!(course["name"], "New");
    assert_eq!(course["file_name"], "b.pdf");

    let response = app.send("GET", &format!("/courses/{id}/open"), None).await;
    assert_eq!(
        body_json(response).await.as_str().unwrap(),
        STANDARD.encode(b"second")
    );

    let response = app
        .send("PUT", "/courses/4040", Some(&json!({"name": "Ghost"})))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_changes_accept_only_known_values() {
    let app = spawn_app().await;

    let response = app.create_course(&json!({"name": "Status"})).await;
    let id = location_id(&response, "/courses/");

    let response = app
        .send("PUT", &format!("/courses/{id}/status"), Some(&json!({"status": "ACTIVE"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ACTIVE");

    let response = app
        .send("PATCH", &format!("/courses/{id}/status"), Some(&json!({"status": "BLOCKED"})))
        .await;
    assert_eq!(body_json(response).await["status"], "BLOCKED");

    for status in ["", "ARCHIVED"] {
        let response = app
            .send("PUT", &format!("/courses/{id}/status"), Some(&json!({"status": status})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{status:?}");
    }
}

#[tokio::test]
async fn delete_removes_row_and_file() {
    let app = spawn_app().await;

    let response = app
        .create_course(&json!({"name": "Temp", "file_name": "t.pdf", "file_body": data_url(PDF_BYTES)}))
        .await;
    let id = location_id(&response, "/courses/");
    let file = app.attachments.join(format!("{id}.pdf"));
    assert!(file.exists());

    let response = app.send("DELETE", &format!("/courses/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!file.exists());

    let response = app.send("GET", &format!("/courses/{id}/open"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send("DELETE", &format!("/courses/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_without_attachment_has_nothing_to_open() {
    let app = spawn_app().await;

    let response = app.create_course(&json!({"name": "Plain", "file_body": ""})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = location_id(&response, "/courses/");

    let response = app.send("GET", &format!("/courses/{id}/open"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "attachment not found");
}
