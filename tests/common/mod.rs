#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use tapcard::auth::TokenGenerator;
use tapcard::server::{AppState, create_router};
use tapcard::store::{SqliteStore, Store};
use tapcard::types::{Role, User};

/// The full router over a throwaway database, driven in-process.
pub struct TestApp {
    router: Router,
    pub admin_token: String,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("tapcard.db")).expect("open store");
        store.initialize().expect("initialize store");

        let now = Utc::now();
        let admin = User {
            id: Uuid::new_v4().to_string(),
            name: "admin".to_string(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };
        store.create_user(&admin).expect("create admin");

        let issued = TokenGenerator::new()
            .issue(&admin.id, None)
            .expect("issue admin token");
        store.create_token(&issued.token).expect("store admin token");

        let state = Arc::new(AppState::new(Arc::new(store)));

        Self {
            router: create_router(state),
            admin_token: issued.raw,
            _temp_dir: temp_dir,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("route request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Creates a regular user through the admin API and returns `(user_id, token)`.
    pub async fn create_user(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/v1/admin/users",
                Some(&self.admin_token),
                json!({ "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user: {body}");
        let user_id = body["data"]["id"].as_str().expect("user id").to_string();

        let (status, body) = self
            .post(
                &format!("/api/v1/admin/users/{user_id}/tokens"),
                Some(&self.admin_token),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create token: {body}");
        let token = body["data"]["token"].as_str().expect("token").to_string();

        (user_id, token)
    }

    /// Provisions a tag with uid `uid-<code>` and returns its id.
    pub async fn provision_tag(&self, code: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/admin/tags",
                Some(&self.admin_token),
                json!({ "tag_uid": format!("uid-{code}"), "public_code": code }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "provision tag: {body}");
        body["data"]["id"].as_str().expect("tag id").to_string()
    }

    /// Creates a module of `kind` for `owner_id`; `extra` is merged into the request.
    pub async fn create_module(&self, kind: &str, owner_id: &str, extra: Value) -> String {
        let mut request = json!({ "kind": kind, "owner_id": owner_id, "title": format!("{kind} module") });
        if let (Some(target), Value::Object(fields)) = (request.as_object_mut(), extra) {
            target.extend(fields);
        }

        let (status, body) = self
            .post("/api/v1/admin/modules", Some(&self.admin_token), request)
            .await;
        assert_eq!(status, StatusCode::CREATED, "create module: {body}");
        body["data"]["id"].as_str().expect("module id").to_string()
    }
}
