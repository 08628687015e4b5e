//! User entity model.

use chrono::{DateTime, Utc};
use liveboard_core::types::{ConnectionId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A chat participant.
///
/// `is_online` and `connection_id` move together: a user is online exactly
/// when a connection id is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique ignoring case.
    pub email: String,
    /// Argon2 password hash. Absent for users created through the socket.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Avatar URL, stored as an opaque string.
    pub avatar: Option<String>,
    /// Whether a live connection is attached.
    pub is_online: bool,
    /// The currently attached connection, if any.
    pub connection_id: Option<ConnectionId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether `connection_id` is the connection currently attached.
    pub fn is_attached_to(&self, connection_id: ConnectionId) -> bool {
        self.connection_id == Some(connection_id)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Identifier to assign.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Connection to attach immediately; the user starts online when set.
    pub connection_id: Option<ConnectionId>,
}
