//! Message entity model.

use chrono::{DateTime, Utc};
use liveboard_core::types::{MessageId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted chat message.
///
/// Broadcast messages have no recipient. Directed messages have one and are
/// the only messages that count towards unread totals.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier (time-ordered).
    pub id: MessageId,
    /// Message body.
    pub text: String,
    /// Author.
    pub sender_id: UserId,
    /// Recipient of a directed message.
    pub recipient_id: Option<UserId>,
    /// Whether this is a directed message.
    pub is_private: bool,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Assigned by the store; non-decreasing in insertion order.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Whether `user_id` wrote this message.
    pub fn is_sent_by(&self, user_id: UserId) -> bool {
        self.sender_id == user_id
    }

    /// The other end of a directed message involving `user`.
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        let recipient = self.recipient_id?;
        if self.sender_id == user {
            Some(recipient)
        } else if recipient == user {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// Whether this message belongs to the conversation between `a` and `b`.
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        match self.recipient_id {
            Some(recipient) => {
                (self.sender_id == a && recipient == b) || (self.sender_id == b && recipient == a)
            }
            None => false,
        }
    }
}

/// Data required to create a new message.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    /// Author.
    pub sender_id: UserId,
    /// Recipient for a directed message.
    pub recipient_id: Option<UserId>,
    /// Message body, already validated.
    pub text: String,
}

impl CreateMessage {
    /// A message to everyone.
    pub fn broadcast(sender_id: UserId, text: impl Into<String>) -> Self {
        Self {
            sender_id,
            recipient_id: None,
            text: text.into(),
        }
    }

    /// A message to a single recipient.
    pub fn direct(sender_id: UserId, recipient_id: UserId, text: impl Into<String>) -> Self {
        Self {
            sender_id,
            recipient_id: Some(recipient_id),
            text: text.into(),
        }
    }
}
