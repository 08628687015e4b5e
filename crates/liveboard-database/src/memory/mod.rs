//! In-process implementation of both store traits.
//!
//! Used for single-node development (`store.provider = "memory"`) and by the
//! test suites. Each method takes the relevant lock once, so conditional
//! writes are atomic just like their SQL counterparts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use liveboard_core::error::AppError;
use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, MessageId, UserId};
use liveboard_entity::{CreateMessage, CreateUser, Message, UnreadCount, User};

use crate::store::{MessageStore, UserStore};

/// Users and messages held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    messages: RwLock<Vec<Message>>,
    available: AtomicBool,
    users_available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            messages: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            users_available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: while unavailable every call fails with
    /// `StoreUnavailable` and nothing is read or written.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Like [`MemoryStore::set_available`], but only for [`UserStore`] calls.
    pub fn set_users_available(&self, available: bool) {
        self.users_available.store(available, Ordering::SeqCst);
    }

    fn ensure_users_available(&self) -> AppResult<()> {
        if self.users_available.load(Ordering::SeqCst) {
            self.ensure_available()
        } else {
            Err(AppError::store_unavailable("In-memory user store is unavailable"))
        }
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::store_unavailable("In-memory store is unavailable"))
        }
    }
}

fn by_name(users: &mut [User]) {
    users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.into_uuid().cmp(&b.id.into_uuid())));
}

fn is_unread_directed(msg: &Message, sender: UserId, recipient: UserId) -> bool {
    msg.is_private && !msg.is_read && msg.sender_id == sender && msg.recipient_id == Some(recipient)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        self.ensure_users_available()?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        self.ensure_users_available()?;
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.ensure_users_available()?;
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, input: CreateUser) -> AppResult<User> {
        self.ensure_users_available()?;
        let mut users = self.users.write().await;
        if users.contains_key(&input.id)
            || users.values().any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(AppError::conflict("User already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: input.id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            avatar: input.avatar,
            is_online: input.connection_id.is_some(),
            connection_id: input.connection_id,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_online(&self) -> AppResult<Vec<User>> {
        self.ensure_users_available()?;
        let mut online: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.is_online)
            .cloned()
            .collect();
        by_name(&mut online);
        Ok(online)
    }

    async fn find_all_except(&self, id: UserId) -> AppResult<Vec<User>> {
        self.ensure_users_available()?;
        let mut others: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.id != id)
            .cloned()
            .collect();
        by_name(&mut others);
        Ok(others)
    }

    async fn attach_connection(
        &self,
        id: UserId,
        connection_id: ConnectionId,
        avatar: Option<&str>,
    ) -> AppResult<Option<User>> {
        self.ensure_users_available()?;
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.connection_id = Some(connection_id);
        user.is_online = true;
        if let Some(avatar) = avatar {
            user.avatar = Some(avatar.to_string());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn detach_connection_if_current(
        &self,
        id: UserId,
        connection_id: ConnectionId,
    ) -> AppResult<bool> {
        self.ensure_users_available()?;
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) if user.is_attached_to(connection_id) => {
                user.connection_id = None;
                user.is_online = false;
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn detach_all(&self) -> AppResult<u64> {
        self.ensure_users_available()?;
        let mut users = self.users.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for user in users.values_mut() {
            if user.is_online || user.connection_id.is_some() {
                user.connection_id = None;
                user.is_online = false;
                user.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create(&self, input: CreateMessage) -> AppResult<Message> {
        self.ensure_available()?;
        let mut messages = self.messages.write().await;

        // Keep created_at non-decreasing in insertion order even if the
        // wall clock steps backwards.
        let mut now: DateTime<Utc> = Utc::now();
        if let Some(last) = messages.last() {
            now = now.max(last.created_at);
        }

        let message = Message {
            id: MessageId::ordered(),
            text: input.text,
            sender_id: input.sender_id,
            recipient_id: input.recipient_id,
            is_private: input.recipient_id.is_some(),
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        self.ensure_available()?;
        Ok(self.messages.read().await.iter().find(|m| m.id == id).cloned())
    }

    async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        self.ensure_available()?;
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect())
    }

    async fn find_recent_broadcasts(&self, limit: usize) -> AppResult<Vec<Message>> {
        self.ensure_available()?;
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .rev()
            .filter(|m| !m.is_private)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_latest_per_peer(&self, user: UserId) -> AppResult<Vec<Message>> {
        self.ensure_available()?;
        let messages = self.messages.read().await;
        let mut latest: HashMap<UserId, Message> = HashMap::new();
        for msg in messages.iter().rev() {
            if let Some(peer) = msg.peer_of(user) {
                latest.entry(peer).or_insert_with(|| msg.clone());
            }
        }
        Ok(latest.into_values().collect())
    }

    async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        self.ensure_available()?;
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| is_unread_directed(m, sender, recipient))
            .count() as u64)
    }

    async fn mark_read(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        self.ensure_available()?;
        let mut messages = self.messages.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for msg in messages
            .iter_mut()
            .filter(|m| is_unread_directed(m, sender, recipient))
        {
            msg.is_read = true;
            msg.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_counts_by_sender(&self, recipient: UserId) -> AppResult<Vec<UnreadCount>> {
        self.ensure_available()?;
        let messages = self.messages.read().await;
        let mut counts: Vec<UnreadCount> = Vec::new();
        for msg in messages
            .iter()
            .filter(|m| m.is_private && !m.is_read && m.recipient_id == Some(recipient))
        {
            match counts.iter_mut().find(|c| c.user_id == msg.sender_id) {
                Some(entry) => entry.count += 1,
                None => counts.push(UnreadCount {
                    user_id: msg.sender_id,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn update_text(
        &self,
        id: MessageId,
        sender: UserId,
        text: &str,
    ) -> AppResult<Option<Message>> {
        self.ensure_available()?;
        let mut messages = self.messages.write().await;
        let Some(msg) = messages
            .iter_mut()
            .find(|m| m.id == id && m.is_sent_by(sender))
        else {
            return Ok(None);
        };
        msg.text = text.to_string();
        msg.updated_at = Utc::now();
        Ok(Some(msg.clone()))
    }

    async fn delete(&self, id: MessageId, sender: UserId) -> AppResult<bool> {
        self.ensure_available()?;
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| !(m.id == id && m.is_sent_by(sender)));
        Ok(messages.len() < before)
    }
}
