//! Message router: persists messages and fans them out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use liveboard_core::error::AppError;
use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, MessageId, UserId};
use liveboard_database::{MessageStore, UserStore};
use liveboard_entity::{ChatMessage, CreateMessage, PrivateChatMessage, UserProfile};

use super::history::{ConversationKey, MessageHistory};
use crate::connection::ConnectionPool;
use crate::event::ServerEvent;
use crate::event::validator::validate_text;
use crate::unread::UnreadLedger;

/// Routes global and directed messages.
pub struct MessageRouter {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
    pool: Arc<ConnectionPool>,
    ledger: Arc<UnreadLedger>,
    history: MessageHistory,
    max_message_length: usize,
}

impl MessageRouter {
    pub fn new(
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
        pool: Arc<ConnectionPool>,
        ledger: Arc<UnreadLedger>,
        max_message_length: usize,
    ) -> Self {
        Self {
            history: MessageHistory::new(users.clone(), messages.clone()),
            users,
            messages,
            pool,
            ledger,
            max_message_length,
        }
    }

    /// Persists a broadcast message and sends it to every connection,
    /// the sender's own included.
    pub async fn send_global(&self, sender_id: UserId, text: &str) -> AppResult<ChatMessage> {
        let text = validate_text(text, self.max_message_length)?;
        let sender = self.profile_of(sender_id).await?;

        let message = self
            .messages
            .create(CreateMessage::broadcast(sender_id, text))
            .await?;
        let view = ChatMessage::new(&message, sender);

        let delivered = self.pool.broadcast(&ServerEvent::ReceiveMessage(view.clone()));
        info!(
            message_id = %message.id,
            sender_id = %sender_id,
            delivered,
            "Global message sent"
        );

        Ok(view)
    }

    /// Persists a directed message and delivers it.
    ///
    /// A connected recipient gets the message and an updated unread count,
    /// and the sender gets `message_delivered`. The sender always gets an
    /// echo, on `origin` when the request came from a live connection or
    /// on its stored connection otherwise.
    pub async fn send_direct(
        &self,
        sender_id: UserId,
        origin: Option<ConnectionId>,
        recipient_id: UserId,
        text: &str,
    ) -> AppResult<PrivateChatMessage> {
        let text = validate_text(text, self.max_message_length)?;
        let recipient = self
            .users
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipient not found"))?;
        let sender = self
            .users
            .find_by_id(sender_id)
            .await?
            .ok_or_else(|| AppError::not_found("Sender not found"))?;

        let message = self
            .messages
            .create(CreateMessage::direct(sender_id, recipient_id, text))
            .await?;
        let view = PrivateChatMessage {
            message: ChatMessage::new(&message, UserProfile::from(&sender)),
            from_user_id: sender_id,
            to_user_id: recipient_id,
        };

        let sender_conn = origin.or(sender.connection_id);

        // A stored connection id this process does not hold is stale, so
        // only a queued event counts as delivered.
        let delivered = recipient.connection_id.filter(|conn| {
            self.pool
                .send_to(conn, ServerEvent::ReceivePrivateMessage(view.clone()))
        });

        if let Some(recipient_conn) = delivered {
            if let Some(conn) = sender_conn {
                self.pool.send_to(
                    &conn,
                    ServerEvent::MessageDelivered {
                        message_id: message.id,
                        to_user_id: recipient_id,
                    },
                );
            }
            match self.ledger.count_unread(sender_id, recipient_id).await {
                Ok(count) => {
                    self.pool.send_to(
                        &recipient_conn,
                        ServerEvent::UnreadCountUpdate {
                            from_user_id: sender_id,
                            count,
                        },
                    );
                }
                Err(err) => {
                    warn!(
                        message_id = %message.id,
                        error = %err,
                        "Failed to refresh unread count after direct message"
                    );
                }
            }
        } else {
            debug!(
                message_id = %message.id,
                recipient_id = %recipient_id,
                "Recipient not reachable, message stored only"
            );
        }

        if let Some(conn) = sender_conn {
            self.pool
                .send_to(&conn, ServerEvent::ReceivePrivateMessage(view.clone()));
        }

        info!(
            message_id = %message.id,
            sender_id = %sender_id,
            recipient_id = %recipient_id,
            "Direct message sent"
        );

        Ok(view)
    }

    /// Replaces the text of a message the requester wrote.
    ///
    /// Someone else's message is reported as not found.
    pub async fn edit_message(
        &self,
        requester: UserId,
        message_id: MessageId,
        text: &str,
    ) -> AppResult<ChatMessage> {
        let text = validate_text(text, self.max_message_length)?;
        let message = self
            .messages
            .update_text(message_id, requester, &text)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found or unauthorized"))?;
        let author = self.profile_of(requester).await?;

        debug!(message_id = %message_id, user_id = %requester, "Message edited");
        Ok(ChatMessage::new(&message, author))
    }

    /// Deletes a message the requester wrote.
    pub async fn delete_message(&self, requester: UserId, message_id: MessageId) -> AppResult<()> {
        if !self.messages.delete(message_id, requester).await? {
            return Err(AppError::not_found("Message not found or unauthorized"));
        }

        debug!(message_id = %message_id, user_id = %requester, "Message deleted");
        Ok(())
    }

    /// Conversation history, oldest first.
    pub async fn history(&self, key: ConversationKey) -> AppResult<Vec<ChatMessage>> {
        self.history.load(key).await
    }

    async fn profile_of(&self, user_id: UserId) -> AppResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::not_found("Sender not found"))
    }
}
