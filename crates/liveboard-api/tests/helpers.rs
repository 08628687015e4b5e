//! Shared test helpers for API integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use liveboard_api::{AppState, build_app};
use liveboard_core::config::{AppConfig, StoreProvider};
use liveboard_core::types::UserId;
use liveboard_database::MemoryStore;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

/// A registered and logged-in account.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    /// Create a new test application over an in-memory store
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.store.provider = StoreProvider::Memory;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone(), store.clone());
        let router = build_app(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    /// Register an account and log it in
    pub async fn signup(&self, name: &str) -> TestUser {
        let email = format!("{}@example.com", name.to_lowercase());
        let password = "password123";

        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({ "name": name, "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );

        let token = self.login(&email, password).await;
        let id = response.body["data"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("No id in register response");

        TestUser {
            id,
            name: name.to_string(),
            email,
            token,
        }
    }

    /// Login and return the bearer token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let app = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

pub async fn connect(addr: SocketAddr, token: &str) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .expect("WebSocket handshake failed");
    ws
}

/// Next text frame as JSON.
pub async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Socket closed")
            .expect("Socket error");
        if frame.is_text() {
            let text = frame.to_text().expect("text frame");
            return serde_json::from_str(text).expect("event is JSON");
        }
    }
}

/// Skips events until one named `name` arrives.
pub async fn next_named(ws: &mut WsClient, name: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["event"] == name {
            return event;
        }
    }
}
