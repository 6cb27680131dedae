#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use soundshelf_api::{app, config::AppConfig, database::MemoryStore, state::AppState};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestServer {
    /// Serves a fresh app over an empty in-memory store on a free port.
    pub async fn start() -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.jwt_secret = TEST_JWT_SECRET.to_string();
        config.security.bcrypt_cost = 4;
        config.api.enable_request_logging = false;

        let state = AppState::new(Arc::new(MemoryStore::new()), config);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn patch(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/users/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Registers and logs in a user named `username` with a derived email.
    pub async fn signup(&self, username: &str) -> Result<TestUser> {
        let email = format!("{}@example.com", username);

        let res = self.register(username, &email, "hunter2").await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let id = res.json::<Value>().await?["_id"]
            .as_str()
            .context("register response without _id")?
            .to_string();

        let res = self.login(&email, "hunter2").await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let token = res.json::<Value>().await?["accessToken"]
            .as_str()
            .context("login response without accessToken")?
            .to_string();

        Ok(TestUser { id, email, token })
    }

    pub async fn create_track(&self, user: &TestUser, body: Value) -> Result<Value> {
        let res = self.post("/tracks", &user.token, &body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create track failed: {}", res.status());
        Ok(res.json().await?)
    }
}

pub fn id_of(doc: &Value) -> &str {
    doc["_id"].as_str().unwrap_or_default()
}

pub async fn message(res: reqwest::Response) -> Result<String> {
    let body = res.json::<Value>().await?;
    Ok(body["message"].as_str().unwrap_or_default().to_string())
}
