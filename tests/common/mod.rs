#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use facegate::api::{self, AppState};
use facegate::clients::assets::{AssetError, AssetStore};
use facegate::clients::face_recognition::{FaceVerifier, Verdict, VerifyError};
use facegate::config::Config;
use facegate::db::Store;
use facegate::models::photo::Photo;
use facegate::services::FixedClock;
use facegate::state::{Collaborators, SharedState};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PREFIX: &str = "/api/v1";
const BOUNDARY: &str = "facegate-test-boundary";

/// Replays queued verdicts, then answers "verified" once the queue is empty.
#[derive(Default)]
pub struct FakeVerifier {
    replies: Mutex<VecDeque<Result<Verdict, VerifyError>>>,
    calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn push(&self, reply: Result<Verdict, VerifyError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn mismatch() -> Result<Verdict, VerifyError> {
    Ok(Verdict {
        verified: false,
        similarity: Some(0.31),
        threshold: Some(0.8),
    })
}

#[async_trait]
impl FaceVerifier for FakeVerifier {
    async fn verify(&self, _photo: &Photo, _user_id: &str) -> Result<Verdict, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies.lock().unwrap().pop_front().unwrap_or(Ok(Verdict {
            verified: true,
            similarity: Some(0.93),
            threshold: Some(0.8),
        }))
    }
}

#[derive(Default)]
pub struct FakeAssets {
    uploads: AtomicUsize,
}

impl FakeAssets {
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn upload(&self, _photo: &Photo, folder: &str) -> Result<String, AssetError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://assets.test/{folder}/{n}.jpg"))
    }
}

pub struct TestApp {
    pub router: Router,
    pub shared: Arc<SharedState>,
    pub verifier: Arc<FakeVerifier>,
    pub assets: Arc<FakeAssets>,
    pub clock: Arc<FixedClock>,
}

pub fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("facegate-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Store::new(&config.general.database_url)
        .await
        .expect("Failed to open store");

    let verifier = Arc::new(FakeVerifier::default());
    let assets = Arc::new(FakeAssets::default());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ));

    let collaborators = Collaborators {
        verifier: verifier.clone(),
        assets: assets.clone(),
        clock: clock.clone(),
    };

    let shared = Arc::new(SharedState::with_collaborators(config, store, collaborators));
    let router = api::router(AppState::new(shared.clone(), None));

    TestApp {
        router,
        shared,
        verifier,
        assets,
        clock,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", path, token, Body::empty())).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("DELETE", path, token, Body::empty())).await
    }

    pub async fn json(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut req = request(method, path, token, Body::from(body.to_string()));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        self.send(req).await
    }

    pub async fn multipart(
        &self,
        path: &str,
        token: Option<&str>,
        photo: Option<&[u8]>,
        location: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut req = request("POST", path, token, Body::from(multipart_body(photo, location)));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}")
                .parse()
                .unwrap(),
        );
        self.send(req).await
    }

    pub async fn register(&self, name: &str, email: &str, employee_id: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            &format!("{PREFIX}/auth/register"),
            None,
            json!({
                "name": name,
                "email": email,
                "password": "secret123",
                "employee_id": employee_id,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            &format!("{PREFIX}/auth/login"),
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Registers a user and returns `(user_id, token)`.
    pub async fn signed_in(&self, email: &str, employee_id: &str) -> (String, String) {
        let (status, body) = self.register("Test User", email, employee_id).await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        let user_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = self.login(email, "secret123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        (user_id, token)
    }
}

fn request(method: &str, path: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).unwrap()
}

fn multipart_body(photo: Option<&[u8]>, location: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(bytes) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"face.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(location) = location {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"location\"\r\n\r\n{location}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
