//! Connection pool: every live connection's outbound handle.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use liveboard_core::types::ConnectionId;

use super::handle::{ConnectionHandle, SendOutcome};
use crate::event::ServerEvent;
use crate::metrics::RealtimeMetrics;

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    metrics: Arc<RealtimeMetrics>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new(metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            by_id: DashMap::new(),
            metrics,
        }
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Sends to one connection. Returns whether the event was queued.
    pub fn send_to(&self, conn_id: &ConnectionId, event: ServerEvent) -> bool {
        match self.get(conn_id) {
            Some(handle) => self.deliver(&handle, event),
            None => {
                debug!(conn_id = %conn_id, event = event.name(), "Target connection not in pool");
                false
            }
        }
    }

    /// Sends to every connection. Returns how many queued it.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        self.fan_out(event, None)
    }

    /// Sends to every connection except `excluded`.
    pub fn broadcast_except(&self, excluded: &ConnectionId, event: &ServerEvent) -> usize {
        self.fan_out(event, Some(excluded))
    }

    /// Marks every connection closed and empties the pool. Dropping the
    /// handles closes their outbound channels, which ends the socket tasks.
    pub fn close_all(&self) -> usize {
        let handles = self.snapshot();
        for handle in &handles {
            handle.mark_closed();
            self.by_id.remove(&handle.id);
        }
        handles.len()
    }

    fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn fan_out(&self, event: &ServerEvent, excluded: Option<&ConnectionId>) -> usize {
        // Collect first so no shard lock is held while sending.
        let mut queued = 0;
        for handle in self.snapshot() {
            if Some(&handle.id) == excluded {
                continue;
            }
            if self.deliver(&handle, event.clone()) {
                queued += 1;
            }
        }
        queued
    }

    fn deliver(&self, handle: &ConnectionHandle, event: ServerEvent) -> bool {
        match handle.send(event) {
            SendOutcome::Queued => {
                self.metrics.event_delivered();
                true
            }
            SendOutcome::Dropped => {
                self.metrics.event_dropped();
                false
            }
            SendOutcome::Closed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveboard_auth::VerifiedIdentity;
    use liveboard_core::types::UserId;
    use tokio::sync::mpsc;

    fn connect(pool: &ConnectionPool) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = Arc::new(ConnectionHandle::new(
            VerifiedIdentity {
                user_id: UserId::new(),
                email: "x@example.com".to_string(),
                name: "X".to_string(),
            },
            tx,
        ));
        let id = handle.id;
        pool.add(handle);
        (id, rx)
    }

    #[tokio::test]
    async fn test_broadcast_except_skips_origin() {
        let pool = ConnectionPool::new(Arc::new(RealtimeMetrics::new()));
        let (a, mut rx_a) = connect(&pool);
        let (_b, mut rx_b) = connect(&pool);

        let sent = pool.broadcast_except(&a, &ServerEvent::UserCount(2));
        assert_eq!(sent, 1);
        assert_eq!(rx_b.recv().await, Some(ServerEvent::UserCount(2)));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection() {
        let pool = ConnectionPool::new(Arc::new(RealtimeMetrics::new()));
        assert!(!pool.send_to(&ConnectionId::new(), ServerEvent::UserCount(0)));
    }

    #[tokio::test]
    async fn test_close_all_ends_receivers() {
        let pool = ConnectionPool::new(Arc::new(RealtimeMetrics::new()));
        let (_a, mut rx_a) = connect(&pool);
        assert_eq!(pool.close_all(), 1);
        assert_eq!(pool.connection_count(), 0);
        assert_eq!(rx_a.recv().await, None);
    }
}
