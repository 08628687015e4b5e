//! Shared helpers for engine behaviour tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use liveboard_auth::VerifiedIdentity;
use liveboard_core::config::RealtimeConfig;
use liveboard_core::types::{ConnectionId, UserId};
use liveboard_database::{MemoryStore, UserStore};
use liveboard_entity::User;
use liveboard_realtime::{ChatEngine, ServerEvent};

/// An isolated engine over a fresh in-memory store.
pub struct TestEngine {
    pub engine: ChatEngine,
    pub store: Arc<MemoryStore>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(RealtimeConfig::default())
    }

    pub fn with_config(config: RealtimeConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = ChatEngine::new(config, store.clone(), store.clone());
        Self { engine, store }
    }

    /// A second engine over the same store, as after a process restart.
    pub fn restarted(&self) -> Self {
        let engine = ChatEngine::new(
            RealtimeConfig::default(),
            self.store.clone(),
            self.store.clone(),
        );
        Self {
            engine,
            store: self.store.clone(),
        }
    }

    pub fn identity(name: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            user_id: UserId::new(),
            email: format!("{}@example.com", name.to_lowercase()),
            name: name.to_string(),
        }
    }

    /// Opens a connection and discards the initial history.
    pub async fn connect(&self, identity: &VerifiedIdentity) -> TestClient {
        let mut client = self.open(identity).await;
        client.drain();
        client
    }

    /// Opens a connection and keeps every queued event.
    pub async fn open(&self, identity: &VerifiedIdentity) -> TestClient {
        let (handle, rx) = self.engine.connections.open(identity.clone()).await;
        TestClient {
            conn_id: handle.id,
            identity: identity.clone(),
            engine: self.engine.clone(),
            rx,
        }
    }

    /// Connects, registers and clears the resulting presence events.
    pub async fn join(&self, identity: &VerifiedIdentity) -> TestClient {
        let mut client = self.connect(identity).await;
        client.register().await;
        client.drain();
        client
    }

    pub async fn user(&self, id: UserId) -> User {
        UserStore::find_by_id(self.store.as_ref(), id)
            .await
            .expect("store")
            .expect("user exists")
    }

    pub async fn user_by_email(&self, email: &str) -> User {
        UserStore::find_by_email(self.store.as_ref(), email)
            .await
            .expect("store")
            .expect("user exists")
    }
}

/// One simulated socket: inbound frames go to the dispatcher, outbound
/// events are read from the connection buffer.
pub struct TestClient {
    pub conn_id: ConnectionId,
    pub identity: VerifiedIdentity,
    engine: ChatEngine,
    rx: mpsc::Receiver<ServerEvent>,
}

impl TestClient {
    pub async fn send(&self, frame: Value) {
        self.send_raw(&frame.to_string()).await;
    }

    pub async fn send_raw(&self, raw: &str) {
        self.engine
            .connections
            .handle_inbound(self.conn_id, raw)
            .await;
    }

    pub async fn register(&self) {
        self.send(json!({
            "event": "register_user",
            "data": { "name": self.identity.name, "email": self.identity.email }
        }))
        .await;
    }

    pub async fn close(&self) {
        self.engine.connections.close(self.conn_id).await;
    }

    /// Everything queued so far, in order.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn error_code(event: &ServerEvent) -> Option<&str> {
    match event {
        ServerEvent::Error { code, .. } => Some(code.as_str()),
        _ => None,
    }
}
