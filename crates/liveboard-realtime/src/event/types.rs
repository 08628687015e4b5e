//! Inbound and outbound event definitions.
//!
//! Every frame is `{"event": "<snake_case name>", "data": <payload>}`.
//! Payload fields are camelCase. Events without a payload may omit `data`.

use serde::{Deserialize, Serialize};

use liveboard_core::error::AppError;
use liveboard_core::types::{ConnectionId, MessageId, UserId};
use liveboard_entity::{ChatMessage, PrivateChatMessage, UnreadCount, UserProfile};

/// Events sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Claim the connection for the user described by the profile.
    RegisterUser(RegisterProfile),
    /// Post a global message.
    SendMessage { text: String },
    /// Post a directed message.
    SendPrivateMessage { text: String, to_user_id: UserId },
    /// Global typing state.
    Typing(bool),
    /// Typing state towards one user.
    TypingPrivate { to_user_id: UserId, is_typing: bool },
    /// Mark everything `other_user_id` sent to the caller as read.
    MarkMessagesRead { other_user_id: UserId },
    /// Ask for the online user list.
    RequestUserList,
    /// Ask for unread totals grouped by sender.
    GetUnreadCounts,
    /// Legacy no-op kept for older clients.
    JoinChat,
}

impl ClientEvent {
    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterUser(_) => "register_user",
            Self::SendMessage { .. } => "send_message",
            Self::SendPrivateMessage { .. } => "send_private_message",
            Self::Typing(_) => "typing",
            Self::TypingPrivate { .. } => "typing_private",
            Self::MarkMessagesRead { .. } => "mark_messages_read",
            Self::RequestUserList => "request_user_list",
            Self::GetUnreadCounts => "get_unread_counts",
            Self::JoinChat => "join_chat",
        }
    }

    /// Whether a failure is reported back to the client.
    ///
    /// Failures of the other events are logged and dropped.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Self::RegisterUser(_)
                | Self::SendMessage { .. }
                | Self::SendPrivateMessage { .. }
                | Self::MarkMessagesRead { .. }
                | Self::GetUnreadCounts
        )
    }
}

/// Profile carried by `register_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProfile {
    /// Client-side id hint; the verified identity decides who the user is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Events sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Recent broadcast messages, oldest first. Sent once on connect.
    History(Vec<ChatMessage>),
    /// A new global message.
    ReceiveMessage(ChatMessage),
    /// A new directed message, sent to the recipient and echoed to the sender.
    ReceivePrivateMessage(PrivateChatMessage),
    /// Online users.
    UserList(Vec<UserProfile>),
    /// Number of online users.
    UserCount(usize),
    /// Someone is typing in the global room.
    TypingIndicator {
        connection_id: ConnectionId,
        is_typing: bool,
    },
    /// Someone is typing to the receiver.
    TypingIndicatorPrivate { from_user_id: UserId, is_typing: bool },
    /// Unread total from one sender changed.
    UnreadCountUpdate { from_user_id: UserId, count: u64 },
    /// Unread totals grouped by sender.
    UnreadCounts(Vec<UnreadCount>),
    /// The receiver's messages to `read_by_user_id` were read.
    MessagesReadUpdate { read_by_user_id: UserId },
    /// A directed message reached a live recipient connection.
    MessageDelivered {
        message_id: MessageId,
        to_user_id: UserId,
    },
    /// A request-style event failed.
    Error { code: String, message: String },
}

impl ServerEvent {
    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::History(_) => "history",
            Self::ReceiveMessage(_) => "receive_message",
            Self::ReceivePrivateMessage(_) => "receive_private_message",
            Self::UserList(_) => "user_list",
            Self::UserCount(_) => "user_count",
            Self::TypingIndicator { .. } => "typing_indicator",
            Self::TypingIndicatorPrivate { .. } => "typing_indicator_private",
            Self::UnreadCountUpdate { .. } => "unread_count_update",
            Self::UnreadCounts(_) => "unread_counts",
            Self::MessagesReadUpdate { .. } => "messages_read_update",
            Self::MessageDelivered { .. } => "message_delivered",
            Self::Error { .. } => "error",
        }
    }
}

impl From<&AppError> for ServerEvent {
    fn from(err: &AppError) -> Self {
        Self::Error {
            code: err.kind.code().to_string(),
            message: err.message.clone(),
        }
    }
}
