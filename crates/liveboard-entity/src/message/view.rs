//! Message views sent to clients.

use chrono::{DateTime, Utc};
use liveboard_core::types::{MessageId, UserId};
use serde::{Deserialize, Serialize};

use super::model::Message;
use crate::user::UserProfile;

/// A message with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub user: UserProfile,
    pub is_private: bool,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Combine a stored message with its author's profile.
    pub fn new(message: &Message, author: UserProfile) -> Self {
        Self {
            id: message.id,
            text: message.text.clone(),
            user: author,
            is_private: message.is_private,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

/// A directed message tagged with both ends of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateChatMessage {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
}

/// Unread directed messages from one sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub user_id: UserId,
    pub count: u64,
}
