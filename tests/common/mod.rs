#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use notes_api::auth::{issue_session_token, Identity, JwtSessionProvider};
use notes_api::config::{SecurityConfig, SessionConfig};
use notes_api::database::MemoryStore;
use notes_api::AppState;

pub const SESSION_SECRET: &str = "integration-test-secret";
pub const COOKIE_NAME: &str = "appSession";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: MemoryStore,
    client: reqwest::Client,
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: SESSION_SECRET.to_string(),
        issuer: None,
        audience: None,
        cookie_name: COOKIE_NAME.to_string(),
        token_ttl_hours: 1,
    }
}

impl TestServer {
    /// Boot the router on a free port, backed by a fresh in-memory store
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = MemoryStore::new();
        let sessions = Arc::new(JwtSessionProvider::new(session_config()));
        let state = AppState::new(Arc::new(store.clone()), sessions);
        let security = SecurityConfig {
            enable_cors: false,
            cors_origins: vec![],
        };
        let app = notes_api::app(state, &security);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST one operation to /api/notes, optionally as `token`'s bearer
    pub async fn call(&self, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let mut req = self
            .client
            .post(format!("{}/api/notes", self.base_url))
            .json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }
}

/// Session token for a subject, as the identity provider would issue it
pub fn token_for(subject: &str, email: &str) -> String {
    let identity = Identity::new(subject, email);
    issue_session_token(&identity, &session_config(), chrono::Duration::hours(1))
        .expect("failed to mint test token")
}
