//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use liveboard_auth::VerifiedIdentity;
use liveboard_core::types::ConnectionId;

use crate::event::ServerEvent;

/// Outcome of pushing one event into a connection's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Queued for the socket writer.
    Queued,
    /// The buffer was full; the event was discarded.
    Dropped,
    /// The socket is gone.
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's outbound buffer plus the
/// identity verified at handshake.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity from the handshake token.
    pub identity: VerifiedIdentity,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<ServerEvent>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(identity: VerifiedIdentity, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            identity,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Queue an event without waiting. Never blocks the caller.
    pub fn send(&self, event: ServerEvent) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(event) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    conn_id = %self.id,
                    event = event.name(),
                    "Connection send buffer full, dropping event"
                );
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                SendOutcome::Closed
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed. Later sends are refused.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveboard_core::types::UserId;

    fn identity() -> VerifiedIdentity {
        VerifiedIdentity {
            user_id: UserId::new(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_buffer_drops_instead_of_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(identity(), tx);

        assert_eq!(handle.send(ServerEvent::UserCount(1)), SendOutcome::Queued);
        assert_eq!(handle.send(ServerEvent::UserCount(2)), SendOutcome::Dropped);
        assert_eq!(rx.recv().await, Some(ServerEvent::UserCount(1)));
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn test_closed_receiver_marks_handle_dead() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(identity(), tx);
        drop(rx);

        assert_eq!(handle.send(ServerEvent::UserCount(1)), SendOutcome::Closed);
        assert!(!handle.is_alive());
    }
}
