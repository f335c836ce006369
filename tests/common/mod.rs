#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use timesheets::config::Config;
use timesheets::db::MemoryStore;
use timesheets::models::{CreateUserRequest, User, UserRole};
use timesheets::state::SharedState;

pub const PASSWORD: &str = "password123";

/// A running test server backed by a fresh in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: SharedState,
    pub client: Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        token_ttl: chrono::Duration::hours(8),
        max_body_size: 1_048_576,
        login_max_failures: 5,
        login_window_secs: 900,
        log_level: "warn".to_string(),
        cors_origins: vec!["*".to_string()],
        bootstrap_admin: None,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a user directly through the service layer.
    pub async fn create_user(&self, username: &str, employee_number: i32, role: UserRole) -> User {
        self.state
            .users
            .create(&CreateUserRequest {
                username: Some(username.to_string()),
                password: Some(PASSWORD.to_string()),
                first_name: Some(username.to_string()),
                last_name: Some("Tester".to_string()),
                employee_number: Some(employee_number),
                role: Some(role),
                active: Some(true),
            })
            .await
            .expect("create user failed")
    }

    /// Login and return the response body + status.
    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Login with the shared test password and return the bearer token.
    pub async fn token_for(&self, username: &str) -> String {
        let (body, status) = self.login(username, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Seed an admin and return its token.
    pub async fn admin_token(&self) -> String {
        self.create_user("admin", 1, UserRole::Admin).await;
        self.token_for("admin").await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Create a timesheet, return the timesheet JSON.
    pub async fn create_timesheet(&self, token: &str, body: &Value) -> Value {
        let (json, status) = self.post_auth("/api/v1/timesheets", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "create timesheet failed: {json}");
        json
    }
}

/// Spawn a test app with an empty in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let (app, state) = timesheets::build_app(Arc::new(MemoryStore::new()), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        state,
        client,
    }
}
