//! Conversation history with authors resolved.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use liveboard_core::result::AppResult;
use liveboard_core::types::UserId;
use liveboard_database::{MessageStore, UserStore};
use liveboard_entity::{ChatMessage, Message, UserProfile};

/// Which conversation to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKey {
    /// The newest `limit` broadcast messages.
    Global { limit: usize },
    /// Every directed message between two users.
    Direct(UserId, UserId),
}

/// Loads conversations oldest-first, ordered by timestamp.
pub struct MessageHistory {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
}

impl MessageHistory {
    pub fn new(users: Arc<dyn UserStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { users, messages }
    }

    pub async fn load(&self, key: ConversationKey) -> AppResult<Vec<ChatMessage>> {
        let records = match key {
            ConversationKey::Global { limit } => {
                let mut newest_first = self.messages.find_recent_broadcasts(limit).await?;
                newest_first.reverse();
                newest_first
            }
            ConversationKey::Direct(a, b) => self.messages.find_conversation(a, b).await?,
        };
        self.hydrate(&records).await
    }

    /// Attaches author profiles with a single user lookup.
    pub async fn hydrate(&self, records: &[Message]) -> AppResult<Vec<ChatMessage>> {
        let mut author_ids: Vec<UserId> = records.iter().map(|m| m.sender_id).collect();
        author_ids.sort_by_key(|id| id.into_uuid());
        author_ids.dedup();

        let authors: HashMap<UserId, UserProfile> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, UserProfile::from(user)))
            .collect();

        Ok(records
            .iter()
            .filter_map(|message| match authors.get(&message.sender_id) {
                Some(author) => Some(ChatMessage::new(message, author.clone())),
                None => {
                    warn!(
                        message_id = %message.id,
                        sender_id = %message.sender_id,
                        "Skipping message with unknown author"
                    );
                    None
                }
            })
            .collect())
    }
}
