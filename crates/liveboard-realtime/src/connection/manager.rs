//! Connection manager: connection lifecycle and per-connection event dispatch.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use liveboard_auth::VerifiedIdentity;
use liveboard_core::config::RealtimeConfig;
use liveboard_core::error::AppError;
use liveboard_core::result::AppResult;
use liveboard_core::types::ConnectionId;

use crate::event::serializer::decode_client_event;
use crate::event::{ClientEvent, ServerEvent};
use crate::messaging::{ConversationKey, MessageRouter};
use crate::metrics::RealtimeMetrics;
use crate::presence::PresenceCoordinator;
use crate::signal::SignalRelay;
use crate::unread::UnreadLedger;

use super::handle::ConnectionHandle;
use super::pool::ConnectionPool;
use super::registry::ConnectionRegistry;

/// Opens, closes and dispatches for every live connection.
///
/// Events from one connection are handled in arrival order because the
/// socket task awaits [`ConnectionManager::handle_inbound`] before reading
/// the next frame.
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    registry: Arc<ConnectionRegistry>,
    presence: Arc<PresenceCoordinator>,
    router: Arc<MessageRouter>,
    ledger: Arc<UnreadLedger>,
    relay: Arc<SignalRelay>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.pool.connection_count())
            .field("registered", &self.registry.len())
            .finish()
    }
}

impl ConnectionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RealtimeConfig,
        pool: Arc<ConnectionPool>,
        registry: Arc<ConnectionRegistry>,
        presence: Arc<PresenceCoordinator>,
        router: Arc<MessageRouter>,
        ledger: Arc<UnreadLedger>,
        relay: Arc<SignalRelay>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool,
            registry,
            presence,
            router,
            ledger,
            relay,
            metrics,
            config,
        }
    }

    /// Accepts an authenticated connection.
    ///
    /// Returns the handle and the receiver the socket writer drains. The
    /// recent global history is queued as the first event.
    pub async fn open(
        &self,
        identity: VerifiedIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity, tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %handle.identity.user_id,
            "WebSocket connection opened"
        );

        let key = ConversationKey::Global {
            limit: self.config.history_limit,
        };
        match self.router.history(key).await {
            Ok(history) => {
                self.pool.send_to(&handle.id, ServerEvent::History(history));
            }
            Err(err) => {
                warn!(conn_id = %handle.id, error = %err, "Failed to load history");
                self.pool.send_to(&handle.id, ServerEvent::from(&err));
            }
        }

        (handle, rx)
    }

    /// Tears down a connection and releases its presence.
    pub async fn close(&self, conn_id: ConnectionId) {
        if let Some(handle) = self.pool.remove(&conn_id) {
            handle.mark_closed();
            self.metrics.connection_closed();
        }

        if let Err(err) = self.presence.disconnect(conn_id).await {
            warn!(conn_id = %conn_id, error = %err, "Failed to release presence");
        }

        info!(conn_id = %conn_id, "WebSocket connection closed");
    }

    /// Decodes and handles one inbound text frame.
    pub async fn handle_inbound(&self, conn_id: ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(&conn_id) else {
            warn!(conn_id = %conn_id, "Event from unknown connection");
            return;
        };

        self.metrics.event_received();

        let event = match decode_client_event(raw, self.config.max_frame_bytes) {
            Ok(event) => event,
            Err(err) => {
                debug!(conn_id = %conn_id, error = %err, "Rejected inbound frame");
                self.metrics.request_failed();
                self.pool.send_to(&conn_id, ServerEvent::from(&err));
                return;
            }
        };

        let name = event.name();
        let expects_reply = event.expects_reply();

        if let Err(err) = self.dispatch(&handle, event).await {
            if expects_reply {
                self.metrics.request_failed();
                warn!(conn_id = %conn_id, event = name, error = %err, "Request failed");
                self.pool.send_to(&conn_id, ServerEvent::from(&err));
            } else {
                warn!(conn_id = %conn_id, event = name, error = %err, "Event dropped");
            }
        }
    }

    async fn dispatch(&self, handle: &ConnectionHandle, event: ClientEvent) -> AppResult<()> {
        let conn_id = handle.id;

        match event {
            ClientEvent::RegisterUser(profile) => {
                self.presence
                    .register(conn_id, &handle.identity, profile)
                    .await?;
                return Ok(());
            }
            ClientEvent::JoinChat => {
                debug!(conn_id = %conn_id, "Client joined chat");
                return Ok(());
            }
            _ => {}
        }

        let Some(user_id) = self.registry.lookup(&conn_id) else {
            return Err(AppError::unauthorized("Register before sending events"));
        };

        match event {
            ClientEvent::SendMessage { text } => {
                self.router.send_global(user_id, &text).await?;
            }
            ClientEvent::SendPrivateMessage { text, to_user_id } => {
                self.router
                    .send_direct(user_id, Some(conn_id), to_user_id, &text)
                    .await?;
            }
            ClientEvent::Typing(is_typing) => {
                self.relay.typing_global(conn_id, is_typing);
            }
            ClientEvent::TypingPrivate {
                to_user_id,
                is_typing,
            } => {
                self.relay
                    .typing_direct(user_id, to_user_id, is_typing)
                    .await?;
            }
            ClientEvent::MarkMessagesRead { other_user_id } => {
                self.ledger.mark_read(user_id, other_user_id, conn_id).await?;
            }
            ClientEvent::RequestUserList => {
                let online = self.presence.snapshot().await?;
                self.pool.send_to(&conn_id, ServerEvent::UserList(online));
            }
            ClientEvent::GetUnreadCounts => {
                let counts = self.ledger.all_unread_counts(user_id).await?;
                self.pool.send_to(&conn_id, ServerEvent::UnreadCounts(counts));
            }
            ClientEvent::RegisterUser(_) | ClientEvent::JoinChat => {}
        }

        Ok(())
    }

    /// Closes every live connection. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        self.pool.close_all()
    }

    /// Number of open sockets.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of connections bound to a user.
    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }
}
