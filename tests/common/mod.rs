#![allow(dead_code)]

use std::time::Duration;

use axum_test::TestServer;
use crud_api::{
    app,
    config::{AppEnv, Config, SeedUser},
    services::auth::Argon2Params,
    state::AppState,
};
use serde_json::{Value, json};

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "root-password";

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        admin_seed: Some(SeedUser {
            username: ADMIN_USERNAME.into(),
            password: ADMIN_PASSWORD.into(),
        }),
        // cheap parameters; production uses Argon2Params::default()
        password_hash: Argon2Params {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
        body_limit_bytes: 64 * 1024,
        request_timeout: Duration::from_secs(30),
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

pub async fn spawn() -> TestApp {
    let config = test_config();
    let state = app::build_state(&config).await.unwrap();
    let router = app::build_router(state.clone(), &config);

    TestApp {
        server: TestServer::new(router).unwrap(),
        state,
    }
}

impl TestApp {
    pub async fn register(&self, username: &str, password: &str) {
        self.server
            .post("/api/users/register")
            .json(&json!({"username": username, "password": password}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Logs in and returns the bearer token from the response body.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/login")
            .json(&json!({"username": username, "password": password}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn sample_product() -> Value {
    json!({
        "sku": "SKU-001",
        "name": "Keyboard",
        "price": 4500,
        "description": "mechanical keyboard"
    })
}
