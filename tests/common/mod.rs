// Shared harness: the full router over the in-memory stores, driven
// through tower's oneshot so no socket or database is involved.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use gigboard::auth::password;
use gigboard::config::AppConfig;
use gigboard::database::memory::{MemoryDirectory, MemoryLedger};
use gigboard::database::models::{NewClient, Role};
use gigboard::handlers;
use gigboard::state::AppState;

pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        let ledger = Arc::new(MemoryLedger::new());
        let state = AppState::new(AppConfig::development(), directory, ledger);
        TestApp { state }
    }

    /// Routers are cheap to assemble; every call gets a fresh one over the
    /// same shared state.
    pub fn router(&self) -> Router {
        handlers::app(self.state.clone())
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, token, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Writes an admin account straight into the directory, the same way
    /// the gigctl seeding command does, and returns an access token for it.
    pub async fn seed_admin(&self) -> String {
        let id = Uuid::new_v4();
        let new = NewClient {
            id,
            role: Role::Admin,
            first_name: "Ada".to_string(),
            last_name: "Ops".to_string(),
            email: format!("admin-{id}@example.com"),
            password_hash: password::hash_password("sup3r-secret").unwrap(),
            refresh_token_hash: None,
        };
        self.state.directory.create_client(new).await.unwrap();
        self.state
            .tokens
            .issue_pair(id, Role::Admin)
            .unwrap()
            .access_token
    }

    /// Registers a client through the API and returns (access token, id).
    pub async fn register(&self, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "first_name": "Rio",
                    "last_name": "Dev",
                    "email": email,
                    "password": "long-enough-pw",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let token = body["access_token"].as_str().unwrap().to_string();
        let id = Uuid::parse_str(body["client"]["id"].as_str().unwrap()).unwrap();
        (token, id)
    }

    /// Creates a job posting as the given caller and returns its id.
    pub async fn create_job(&self, token: &str, title: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/jobs",
                Some(token),
                json!({ "title": title, "description": "build the thing" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create job failed: {body}");
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    /// Creates a summary as the given caller and returns its id.
    pub async fn create_summary(&self, token: &str, skills: &str) -> i64 {
        let (status, body) = self
            .post(
                "/summaries",
                Some(token),
                json!({ "skills": skills, "bio": "ten years of it", "languages": "en" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create summary failed: {body}");
        body["id"].as_i64().unwrap()
    }
}
