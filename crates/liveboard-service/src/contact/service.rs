//! Contact service: every other user with the viewer's conversation summary.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use liveboard_core::result::AppResult;
use liveboard_core::types::UserId;
use liveboard_database::{MessageStore, UserStore};
use liveboard_entity::{ContactSummary, Message};

/// Builds contact lists.
pub struct ContactService {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
}

impl std::fmt::Debug for ContactService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactService").finish()
    }
}

impl ContactService {
    pub fn new(users: Arc<dyn UserStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { users, messages }
    }

    /// All users except `viewer`.
    ///
    /// Contacts with a conversation come first, newest last message first.
    /// The rest follow by name.
    pub async fn list_contacts(&self, viewer: UserId) -> AppResult<Vec<ContactSummary>> {
        let others = self.users.find_all_except(viewer).await?;
        let unread: HashMap<UserId, u64> = self
            .messages
            .unread_counts_by_sender(viewer)
            .await?
            .into_iter()
            .map(|c| (c.user_id, c.count))
            .collect();

        let latest: HashMap<UserId, Message> = self
            .messages
            .find_latest_per_peer(viewer)
            .await?
            .into_iter()
            .filter_map(|m| m.peer_of(viewer).map(|peer| (peer, m)))
            .collect();

        let mut contacts = Vec::with_capacity(others.len());
        for user in others {
            let last = latest.get(&user.id);
            contacts.push(ContactSummary {
                id: user.id,
                unread_count: unread.get(&user.id).copied().unwrap_or(0),
                last_message: last.map(|m| m.text.clone()).unwrap_or_default(),
                last_message_at: last.map(|m| m.created_at),
                is_read: last.is_none_or(|m| m.is_read),
                is_online: user.is_online,
                name: user.name,
                avatar: user.avatar,
            });
        }

        contacts.sort_by(by_recent_conversation);
        debug!(viewer = %viewer, count = contacts.len(), "Contact list built");
        Ok(contacts)
    }
}

fn by_recent_conversation(a: &ContactSummary, b: &ContactSummary) -> Ordering {
    match (a.last_message_at, b.last_message_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}
