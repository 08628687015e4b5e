//! Persistence traits consumed by the real-time core and the services.
//!
//! Every method is a single store round trip. Conditional writes
//! ([`UserStore::detach_connection_if_current`], [`MessageStore::update_text`],
//! [`MessageStore::delete`]) are atomic in the store itself.

use async_trait::async_trait;

use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, MessageId, UserId};
use liveboard_entity::{CreateMessage, CreateUser, Message, UnreadCount, User};

/// Durable user records.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find every user whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    /// Find a user by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user. A duplicate email is a `Conflict`.
    async fn create(&self, input: CreateUser) -> AppResult<User>;

    /// All users with a live connection, ordered by name.
    async fn find_online(&self) -> AppResult<Vec<User>>;

    /// All users except `id`, ordered by name.
    async fn find_all_except(&self, id: UserId) -> AppResult<Vec<User>>;

    /// Attach `connection_id` and mark the user online.
    ///
    /// `avatar` replaces the stored avatar only when it is `Some`.
    /// Returns `None` when the user does not exist.
    async fn attach_connection(
        &self,
        id: UserId,
        connection_id: ConnectionId,
        avatar: Option<&str>,
    ) -> AppResult<Option<User>>;

    /// Clear the connection and mark the user offline, but only if the stored
    /// connection is still `connection_id`. Returns whether the row changed.
    async fn detach_connection_if_current(
        &self,
        id: UserId,
        connection_id: ConnectionId,
    ) -> AppResult<bool>;

    /// Clear every stored connection and mark everyone offline. Returns how
    /// many rows changed. Connection ids do not survive a process, so this
    /// runs once before accepting sockets and once after the last one closes.
    async fn detach_all(&self) -> AppResult<u64>;
}

/// Durable chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a message. The store assigns id and timestamps; directed
    /// messages start unread.
    async fn create(&self, input: CreateMessage) -> AppResult<Message>;

    /// Find a message by primary key.
    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Directed messages between `a` and `b` in both directions, oldest first.
    async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>>;

    /// The newest `limit` broadcast messages, newest first.
    async fn find_recent_broadcasts(&self, limit: usize) -> AppResult<Vec<Message>>;

    /// For every user `user` has a directed conversation with, the newest
    /// message between them in either direction. One round trip.
    async fn find_latest_per_peer(&self, user: UserId) -> AppResult<Vec<Message>>;

    /// Unread directed messages from `sender` to `recipient`.
    async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<u64>;

    /// Mark every unread message from `sender` to `recipient` as read.
    /// Returns the number of messages changed.
    async fn mark_read(&self, sender: UserId, recipient: UserId) -> AppResult<u64>;

    /// Unread directed messages addressed to `recipient`, grouped by sender.
    /// Senders with nothing unread are omitted.
    async fn unread_counts_by_sender(&self, recipient: UserId) -> AppResult<Vec<UnreadCount>>;

    /// Replace the text of a message written by `sender`.
    /// Returns `None` when no such message exists for that sender.
    async fn update_text(
        &self,
        id: MessageId,
        sender: UserId,
        text: &str,
    ) -> AppResult<Option<Message>>;

    /// Delete a message written by `sender`. Returns whether it existed.
    async fn delete(&self, id: MessageId, sender: UserId) -> AppResult<bool>;
}
