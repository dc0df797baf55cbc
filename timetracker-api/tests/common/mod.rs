/// Common test utilities for API tests
///
/// The router runs against the in-process repository, so these tests need
/// neither PostgreSQL nor Redis.

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use timetracker_api::app::{build_router, AppState};
use timetracker_api::config::Config;
use timetracker_shared::repository::memory::MemoryRepository;
use timetracker_shared::usecase::{AuthSettings, Repositories, Usecases};
use tower::Service as _;

pub const ADMIN_TOKEN: &str = "secret_token";

/// Router plus the store behind it
pub struct TestContext {
    pub repo: Arc<MemoryRepository>,
    pub app: axum::Router,
}

/// A signed-up user and the cookie header that authenticates them
pub struct TestUser {
    pub id: i64,
    pub cookie: String,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub set_cookie: Option<String>,
    pub json: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::default());
        let usecases = Usecases::new(Repositories::memory(repo.clone()), AuthSettings::default());
        let app = build_router(AppState::new(usecases, Config::default()));

        Self { repo, app }
    }

    /// Sends a request; `body` is sent as JSON when present
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            set_cookie,
            json,
        }
    }

    pub async fn sign_up(&self, name: &str) -> TestUser {
        self.sign_up_with(json!({
            "name": name,
            "email": format!("{}@example.com", name),
            "password": "password123"
        }))
        .await
    }

    pub async fn sign_up_admin(&self, name: &str) -> TestUser {
        self.sign_up_with(json!({
            "name": name,
            "email": format!("{}@example.com", name),
            "password": "password123",
            "role": "admin",
            "admin_token": ADMIN_TOKEN
        }))
        .await
    }

    async fn sign_up_with(&self, body: Value) -> TestUser {
        let response = self.send("POST", "/signup", None, Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.json);

        let set_cookie = response.set_cookie.expect("signup sets the session cookie");
        let cookie = set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string();

        TestUser {
            id: response.json["body"]["id"].as_i64().expect("user id"),
            cookie,
        }
    }

    /// `a` subscribes to `b` and `b` to `a`
    pub async fn befriend(&self, a: &TestUser, b: &TestUser) {
        let forward = self
            .send("POST", &format!("/friends/subscribe/{}", b.id), Some(&a.cookie), None)
            .await;
        assert_eq!(forward.status, StatusCode::CREATED);

        let back = self
            .send("POST", &format!("/friends/subscribe/{}", a.id), Some(&b.cookie), None)
            .await;
        assert_eq!(back.status, StatusCode::CREATED);
    }
}
