//! Top-level chat engine that ties the realtime components together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use liveboard_core::config::RealtimeConfig;
use liveboard_core::result::AppResult;
use liveboard_database::{MessageStore, UserStore};

use crate::connection::{ConnectionManager, ConnectionPool, ConnectionRegistry};
use crate::messaging::MessageRouter;
use crate::metrics::RealtimeMetrics;
use crate::presence::PresenceCoordinator;
use crate::signal::SignalRelay;
use crate::unread::UnreadLedger;

/// Owns one registry, one pool and the services built on them.
///
/// Cloning shares the same engine. Two engines built with `new` share
/// nothing, which is what tests rely on.
#[derive(Clone)]
pub struct ChatEngine {
    /// Connection lifecycle and dispatch.
    pub connections: Arc<ConnectionManager>,
    /// Connection to user bindings.
    pub registry: Arc<ConnectionRegistry>,
    /// Outbound buffers of live connections.
    pub pool: Arc<ConnectionPool>,
    pub presence: Arc<PresenceCoordinator>,
    pub router: Arc<MessageRouter>,
    pub ledger: Arc<UnreadLedger>,
    pub relay: Arc<SignalRelay>,
    pub metrics: Arc<RealtimeMetrics>,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine").finish()
    }
}

impl ChatEngine {
    /// Builds an engine over the given stores.
    pub fn new(
        config: RealtimeConfig,
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let pool = Arc::new(ConnectionPool::new(metrics.clone()));
        let presence = Arc::new(PresenceCoordinator::new(
            users.clone(),
            registry.clone(),
            pool.clone(),
        ));
        let ledger = Arc::new(UnreadLedger::new(
            users.clone(),
            messages.clone(),
            pool.clone(),
        ));
        let router = Arc::new(MessageRouter::new(
            users.clone(),
            messages,
            pool.clone(),
            ledger.clone(),
            config.max_message_length,
        ));
        let relay = Arc::new(SignalRelay::new(users, pool.clone()));
        let connections = Arc::new(ConnectionManager::new(
            config,
            pool.clone(),
            registry.clone(),
            presence.clone(),
            router.clone(),
            ledger.clone(),
            relay.clone(),
            metrics.clone(),
        ));

        info!("Chat engine initialized");

        Self {
            connections,
            registry,
            pool,
            presence,
            router,
            ledger,
            relay,
            metrics,
            shutdown_tx,
        }
    }

    /// Clears presence left behind by a previous process. Call once before
    /// accepting connections.
    pub async fn start(&self) -> AppResult<()> {
        let released = self.presence.release_all().await?;
        info!(released, "Chat engine started");
        Ok(())
    }

    /// Marks everyone offline after the sockets are gone, so nothing stays
    /// online once the process exits.
    pub async fn release_presence(&self) {
        if let Err(err) = self.presence.release_all().await {
            warn!(error = %err, "Failed to clear presence on shutdown");
        }
    }

    /// Returns a receiver that fires once on shutdown.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals socket tasks to stop and closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down chat engine");
        let _ = self.shutdown_tx.send(());
        let closed = self.connections.close_all();
        let stats = self.metrics.snapshot();
        info!(
            closed,
            opened = stats.connections_opened,
            delivered = stats.events_delivered,
            dropped = stats.events_dropped,
            "Chat engine shut down"
        );
    }
}
