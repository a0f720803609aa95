//! End-to-end tests against the HTTP surface, with a scripted generative
//! backend and an in-memory store behind the real router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use bottega::api::{create_app_state, router};
use bottega::config::Config;
use bottega::db::MemoryBackend;
use bottega::state::SharedState;
use common::{FakeGenerative, PollStep};

async fn test_app(backend: FakeGenerative) -> Router {
    let mut config = Config::default();
    config.gemini.api_key = "test-key".to_string();
    config.video.poll_interval_seconds = 1;
    config.video.progress_interval_seconds = 1;

    let shared = SharedState::with_parts(
        config,
        Arc::new(backend),
        Arc::new(MemoryBackend::new()),
    );
    router(create_app_state(Arc::new(shared))).await
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn signed_up_as(app: &Router, name: &str, email: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "hunter2",
            "bio": "Woodworker"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

/// Signs up a fresh account and returns its session cookie.
async fn signed_up(app: &Router) -> String {
    signed_up_as(app, "Mara", "mara@example.com").await
}

fn generate_payload() -> Value {
    json!({
        "description": "A hand-carved walnut bowl",
        "audience": "design-minded collectors",
        "platform": "Instagram",
        "aesthetic": "warm and minimal",
        "generate_images": true,
        "image": { "base64": "cHJvZHVjdA==", "mime_type": "image/jpeg" }
    })
}

#[tokio::test]
async fn signup_opens_a_session() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "mara@example.com");
    assert_eq!(body["data"]["bio"], "Woodworker");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = test_app(FakeGenerative::default()).await;

    let response = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        "POST",
        "/api/generate",
        None,
        Some(generate_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = test_app(FakeGenerative::default()).await;
    signed_up(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Imposter",
            "email": "mara@example.com",
            "password": "other"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_with_bad_password_is_unauthorized() {
    let app = test_app(FakeGenerative::default()).await;
    signed_up(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "mara@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_closes_the_session() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_refreshes_the_session() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(
        &app,
        "PUT",
        "/api/auth/profile",
        Some(&cookie),
        Some(json!({
            "name": "Mara R.",
            "email": "mara@atelier.example",
            "bio": "Still a woodworker"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["email"], "mara@atelier.example");
    assert_eq!(body["data"]["name"], "Mara R.");
}

#[tokio::test]
async fn generate_returns_story_with_images_and_saves_it() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/generate",
        Some(&cookie),
        Some(generate_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["saved"], true);
    assert_eq!(
        body["data"]["result"]["story"],
        "A story about craftsmanship.\n\n#Handmade #ArtisanCraft"
    );
    assert_eq!(body["data"]["result"]["images"].as_array().unwrap().len(), 3);

    let response = send(&app, "GET", "/api/catalogue", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "story");
}

#[tokio::test]
async fn generate_rejects_missing_description() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let mut payload = generate_payload();
    payload["description"] = json!("");

    let response = send(&app, "POST", "/api/generate", Some(&cookie), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn translate_round_trips_through_the_backend() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/translate",
        Some(&cookie),
        Some(json!({ "text": "A story #Handmade", "target_language": "Italian" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["translated"], "storia tradotta #Handmade");
}

#[tokio::test]
async fn video_job_runs_to_ready_over_http() {
    let backend = FakeGenerative::with_poll_plan(vec![PollStep::DoneWithUri(
        "https://example.com/v.mp4".to_string(),
    )]);
    let app = test_app(backend).await;
    let cookie = signed_up(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/video",
        Some(&cookie),
        Some(json!({ "prompt": "a cinematic bowl video" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let snapshot = loop {
        let response = send(
            &app,
            "GET",
            &format!("/api/video/{job_id}"),
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        if body["data"]["phase"] == "ready" {
            break body["data"].clone();
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "video job never became ready"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    };

    assert_eq!(snapshot["asset_available"], true);
    assert_eq!(
        snapshot["download_url"],
        "https://example.com/v.mp4&key=test-key"
    );

    let response = send(
        &app,
        "GET",
        &format!("/api/video/{job_id}/asset"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/mp4"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake-video-bytes");

    let response = send(
        &app,
        "DELETE",
        &format!("/api/video/{job_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "GET",
        &format!("/api/video/{job_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn video_jobs_are_invisible_to_other_accounts() {
    let app = test_app(FakeGenerative::default()).await;
    let mara = signed_up(&app).await;
    let noor = signed_up_as(&app, "Noor", "noor@example.com").await;

    let response = send(
        &app,
        "POST",
        "/api/video",
        Some(&mara),
        Some(json!({ "prompt": "a cinematic bowl video" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    // Another authenticated account holding the id sees nothing.
    let response = send(
        &app,
        "GET",
        &format!("/api/video/{job_id}"),
        Some(&noor),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "GET",
        &format!("/api/video/{job_id}/asset"),
        Some(&noor),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A foreign DELETE is a no-op; the owner still sees the job.
    let response = send(
        &app,
        "DELETE",
        &format!("/api/video/{job_id}"),
        Some(&noor),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "GET",
        &format!("/api/video/{job_id}"),
        Some(&mara),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn video_start_requires_a_prompt() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/video",
        Some(&cookie),
        Some(json!({ "prompt": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_endpoint_reports_version_and_uptime() {
    let app = test_app(FakeGenerative::default()).await;
    let cookie = signed_up(&app).await;

    let response = send(&app, "GET", "/api/system/status", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["data"]["uptime"].is_u64());
}
