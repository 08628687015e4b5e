//! Contact list entries.

use chrono::{DateTime, Utc};
use liveboard_core::types::UserId;
use serde::{Deserialize, Serialize};

/// One row of a user's contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    /// The contact's user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Text of the latest directed message in either direction, empty if none.
    pub last_message: String,
    /// When the latest directed message was sent.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Unread messages from this contact to the viewer.
    pub unread_count: u64,
    /// Read flag of the latest message; `true` when there is none.
    pub is_read: bool,
    /// Whether the contact has a live connection.
    pub is_online: bool,
}
