//! Unread ledger: counts are always recomputed from stored messages.

use std::sync::Arc;

use tracing::{debug, warn};

use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, UserId};
use liveboard_database::{MessageStore, UserStore};
use liveboard_entity::{UnreadCount, User};

use crate::connection::ConnectionPool;
use crate::event::ServerEvent;

/// Unread counts and read receipts.
pub struct UnreadLedger {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
    pool: Arc<ConnectionPool>,
}

impl UnreadLedger {
    pub fn new(
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
        pool: Arc<ConnectionPool>,
    ) -> Self {
        Self {
            users,
            messages,
            pool,
        }
    }

    /// Unread directed messages from `sender` to `recipient`.
    pub async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        self.messages.count_unread(sender, recipient).await
    }

    /// Marks everything `other` sent to `reader` as read.
    ///
    /// Idempotent. `other` is told its messages were read if it is online,
    /// and the reader's connection `origin` gets a zero count for `other`.
    /// Returns how many messages changed.
    pub async fn mark_read(
        &self,
        reader: UserId,
        other: UserId,
        origin: ConnectionId,
    ) -> AppResult<u64> {
        let changed = self.messages.mark_read(other, reader).await?;

        // The update already applied; a failed lookup only costs the receipt.
        match self.users.find_by_id(other).await {
            Ok(Some(User {
                connection_id: Some(conn),
                ..
            })) => {
                self.pool.send_to(
                    &conn,
                    ServerEvent::MessagesReadUpdate {
                        read_by_user_id: reader,
                    },
                );
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    reader = %reader,
                    other = %other,
                    error = %err,
                    "Failed to send read receipt"
                );
            }
        }

        self.pool.send_to(
            &origin,
            ServerEvent::UnreadCountUpdate {
                from_user_id: other,
                count: 0,
            },
        );

        debug!(reader = %reader, other = %other, changed, "Messages marked read");
        Ok(changed)
    }

    /// Unread totals for `user`, grouped by sender.
    pub async fn all_unread_counts(&self, user: UserId) -> AppResult<Vec<UnreadCount>> {
        self.messages.unread_counts_by_sender(user).await
    }
}
