//! Shared harness for the HTTP integration tests

#![allow(dead_code)]

use std::net::TcpListener;

use bookshelf::configuration::{AdminSettings, ApplicationSettings, JwtSettings, Settings};
use bookshelf::startup::{run, AppState};
use bookshelf::users::SignUpRequest;
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@bookshelf.test";
pub const ADMIN_PASSWORD: &str = "AdminPass123";
pub const USER_EMAIL: &str = "reader@bookshelf.test";
pub const USER_PASSWORD: &str = "ReaderPass123";
pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub struct TestApp {
    pub address: String,
    pub state: AppState,
    pub settings: Settings,
}

pub fn test_settings() -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            password_hash_cost: 4,
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
            issuer: "bookshelf-test".to_string(),
        },
        admin: Some(AdminSettings {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            full_name: Some("Admin".to_string()),
        }),
    }
}

/// Start the server on a random port with a bootstrap admin and one `User`
pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let settings = test_settings();
    let state = AppState::build(&settings).expect("Failed to build application state");
    state
        .user_service
        .sign_up(&SignUpRequest {
            full_name: Some("Reader".to_string()),
            email: USER_EMAIL.to_string(),
            password: USER_PASSWORD.to_string(),
        })
        .expect("Failed to seed user");

    let server = run(listener, state.clone()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        state,
        settings,
    }
}

impl TestApp {
    /// Client that keeps cookies between requests, like a browser
    pub fn browser(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build client")
    }

    pub async fn sign_in(
        &self,
        client: &reqwest::Client,
        email: &str,
        password: &str,
    ) -> reqwest::Response {
        client
            .post(&format!("{}/signin", &self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Sign in and return the `(accessToken, refreshToken)` from the body
    pub async fn sign_in_tokens(
        &self,
        client: &reqwest::Client,
        email: &str,
        password: &str,
    ) -> (String, String) {
        let response = self.sign_in(client, email, password).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["data"]["accessToken"].as_str().unwrap().to_string(),
            body["data"]["refreshToken"].as_str().unwrap().to_string(),
        )
    }

    /// POST /refresh presenting `refresh_token` explicitly, bypassing any cookie store
    pub async fn refresh_with(&self, refresh_token: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/refresh", &self.address))
            .header("Cookie", format!("refreshToken={}", refresh_token))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn error_code(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body["code"].as_str().unwrap_or_default().to_string()
}
