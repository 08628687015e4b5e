//! Typing indicators. Best-effort, at-most-once, no queueing.

use std::sync::Arc;

use tracing::trace;

use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, UserId};
use liveboard_database::UserStore;

use crate::connection::ConnectionPool;
use crate::event::ServerEvent;

/// Relays typing state to other connections.
pub struct SignalRelay {
    users: Arc<dyn UserStore>,
    pool: Arc<ConnectionPool>,
}

impl SignalRelay {
    pub fn new(users: Arc<dyn UserStore>, pool: Arc<ConnectionPool>) -> Self {
        Self { users, pool }
    }

    /// Tells every other connection that `conn_id` is (not) typing.
    pub fn typing_global(&self, conn_id: ConnectionId, is_typing: bool) -> usize {
        self.pool.broadcast_except(
            &conn_id,
            &ServerEvent::TypingIndicator {
                connection_id: conn_id,
                is_typing,
            },
        )
    }

    /// Tells `to` that `from` is (not) typing, if `to` is online.
    /// Returns whether anything was sent.
    pub async fn typing_direct(&self, from: UserId, to: UserId, is_typing: bool) -> AppResult<bool> {
        let Some(conn) = self
            .users
            .find_by_id(to)
            .await?
            .and_then(|user| user.connection_id)
        else {
            trace!(from = %from, to = %to, "Typing target offline, dropped");
            return Ok(false);
        };

        Ok(self.pool.send_to(
            &conn,
            ServerEvent::TypingIndicatorPrivate {
                from_user_id: from,
                is_typing,
            },
        ))
    }
}
