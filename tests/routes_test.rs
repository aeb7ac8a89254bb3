mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};
use tower::ServiceExt;

use api_scaffold::{
    middleware::cors::CorsConfig,
    repos::InMemoryUserStore,
    services::mail::MailBody,
};
use common::{BUCKET, FailingUserStore, harness, harness_with};

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();

    let response = h.server.get("/api/v1/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": "ok", "route": "v1" }));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn creates_and_lists_users() {
    let h = harness();

    let response = h
        .server
        .post("/api/v1/users")
        .json(&json!({ "name": "alice" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["name"], "alice");
    assert!(created["id"].is_string());

    let response = h.server.get("/api/v1/users").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let users: Value = response.json();
    assert_eq!(users.as_array().map(Vec::len), Some(1));
    assert_eq!(users[0]["name"], "alice");

    let response = h
        .server
        .post("/api/v1/users")
        .json(&json!({ "name": "  " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let h = harness_with(Arc::new(FailingUserStore), None);

    let response = h.server.get("/api/v1/users").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "internal server error");
    assert_eq!(
        h.metrics
            .errors_total("GET", "/api/v1/users", "Internal Server Error"),
        1
    );
}

#[tokio::test]
async fn uploads_lists_and_resolves_files() {
    let h = harness();

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"hello world".to_vec())
            .file_name("Notes.TXT")
            .mime_type("text/plain"),
    );
    let response = h.server.post("/api/v1/files").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["fileName"], "Notes.TXT");
    assert_eq!(body["fileType"], ".txt");
    assert_eq!(body["fileSize"], 11);

    let url = body["url"].as_str().unwrap();
    let prefix = format!("https://{BUCKET}.s3.eu-north-1.amazonaws.com/");
    assert!(url.starts_with(&prefix));
    let key = url.trim_start_matches(&prefix).to_string();
    assert!(key.ends_with(".txt"));

    let stored = h.objects.stored(BUCKET, &key).await.unwrap();
    assert_eq!(stored.content_type, "text/plain; charset=utf-8");

    let response = h.server.get("/api/v1/files").await;
    let listed: Value = response.json();
    assert_eq!(listed, json!([{ "key": key, "size": 11 }]));

    let response = h.server.get(&format!("/api/v1/files/{key}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["url"], url);

    let response = h.server.get("/api/v1/files/missing.png").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let h = harness();

    let form = MultipartForm::new().add_text("note", "no file here");
    let response = h.server.post("/api/v1/files").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sends_plain_and_html_mail() {
    let h = harness();
    let request = json!({
        "name": "<Ann>",
        "email": "ann@example.com",
        "subject": "Hi",
    });

    let response = h.server.post("/api/v1/mail/plain").json(&request).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "mail sent" }));

    let response = h.server.post("/api/v1/mail/html").json(&request).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].recipient, "ann@example.com");
    assert_eq!(sent[0].subject, "Hi");
    assert_eq!(sent[0].body, MailBody::Plain("<Ann>".into()));
    match &sent[1].body {
        MailBody::Html(html) => assert!(html.contains("&lt;Ann&gt;")),
        other => panic!("expected html body, got {other:?}"),
    }

    let response = h
        .server
        .post("/api/v1/mail/plain")
        .json(&json!({ "name": "x", "subject": "y" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_reflect_served_requests() {
    let h = harness();

    h.server.get("/api/v1/healthz").await;
    h.server.get("/api/v1/healthz").await;

    let response = h.server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(
        response
            .header(header::CONTENT_TYPE)
            .to_str()
            .unwrap()
            .starts_with("text/plain; version=0.0.4")
    );
    let text = response.text();
    let healthz = text
        .lines()
        .find(|line| {
            line.starts_with("http_requests_total{")
                && line.contains(r#"endpoint="/api/v1/healthz""#)
        })
        .expect("healthz series");
    assert!(healthz.contains(r#"method="GET""#));
    assert!(healthz.contains(r#"service="api""#));
    assert!(healthz.ends_with(" 2"));
    assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
}

#[tokio::test]
async fn metric_series_are_bounded_by_the_route_table() {
    let h = harness();

    for i in 0..50 {
        h.server.get(&format!("/scan/{i}")).await;
        let response = h.server.get(&format!("/api/v1/files/missing-{i}.png")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    let text = h.server.get("/metrics").await.text();
    let series: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("http_requests_total{"))
        .collect();

    assert_eq!(series.len(), 2, "{series:#?}");
    assert_eq!(h.metrics.requests_total("GET", "/api/v1/files/{key}"), 50);
    assert_eq!(h.metrics.requests_total("GET", "unmatched"), 50);
}

#[tokio::test]
async fn preflight_is_answered_by_cors() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/secure")
                .header(header::ORIGIN, "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The auth gate never runs for a preflight.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(h.metrics.requests_total("OPTIONS", "preflight"), 1);
}

#[tokio::test]
async fn configured_origins_are_echoed() {
    let h = harness_with(
        Arc::new(InMemoryUserStore::new()),
        Some(CorsConfig {
            allowed_origins: vec!["https://app.example.com".into()],
            allowed_methods: vec!["GET".into(), "POST".into()],
            ..CorsConfig::default()
        }),
    );

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .header(header::ORIGIN, "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .header(header::ORIGIN, "https://other.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
