//! Presence coordinator: registration, race-safe disconnect and snapshots.

use std::sync::Arc;

use tracing::{debug, info, warn};

use liveboard_auth::VerifiedIdentity;
use liveboard_core::error::{AppError, ErrorKind};
use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, UserId};
use liveboard_database::UserStore;
use liveboard_entity::{CreateUser, User, UserProfile};

use crate::connection::{ConnectionPool, ConnectionRegistry};
use crate::event::{RegisterProfile, ServerEvent};

/// Binds connections to users and keeps the online flag consistent.
///
/// The stored `connection_id` on the user is the source of truth. A
/// disconnect only clears it when it still names the disconnecting
/// connection, so a late disconnect from a replaced connection can never
/// take a reconnected user offline.
pub struct PresenceCoordinator {
    users: Arc<dyn UserStore>,
    registry: Arc<ConnectionRegistry>,
    pool: Arc<ConnectionPool>,
}

impl std::fmt::Debug for PresenceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceCoordinator")
            .field("registered", &self.registry.len())
            .finish()
    }
}

impl PresenceCoordinator {
    /// Creates a coordinator over the given store, registry and pool.
    pub fn new(
        users: Arc<dyn UserStore>,
        registry: Arc<ConnectionRegistry>,
        pool: Arc<ConnectionPool>,
    ) -> Self {
        Self {
            users,
            registry,
            pool,
        }
    }

    /// Registers `conn_id` as the live connection of the identified user.
    ///
    /// Creates the user on first sight. The registry is bound only after the
    /// store accepted the change; on error nothing is bound.
    pub async fn register(
        &self,
        conn_id: ConnectionId,
        identity: &VerifiedIdentity,
        profile: RegisterProfile,
    ) -> AppResult<User> {
        if !profile.email.trim().eq_ignore_ascii_case(identity.email.trim()) {
            return Err(AppError::unauthorized(
                "Profile email does not match the authenticated user",
            ));
        }

        let name = match profile.name.trim() {
            "" => identity.name.clone(),
            given => given.to_string(),
        };
        let avatar = profile
            .avatar
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        let user = self.upsert(conn_id, identity, name, avatar).await?;
        self.registry.bind(conn_id, user.id);

        info!(
            conn_id = %conn_id,
            user_id = %user.id,
            "User registered and online"
        );

        if let Err(err) = self.broadcast_presence().await {
            warn!(conn_id = %conn_id, error = %err, "Failed to broadcast presence");
        }

        Ok(user)
    }

    /// Releases `conn_id`. The user goes offline only if this connection is
    /// still the one stored on the user record. Returns whether it did.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> AppResult<bool> {
        let Some(user_id) = self.registry.unbind(&conn_id) else {
            debug!(conn_id = %conn_id, "Unregistered connection closed");
            return Ok(false);
        };

        let applied = self
            .users
            .detach_connection_if_current(user_id, conn_id)
            .await?;

        if applied {
            info!(conn_id = %conn_id, user_id = %user_id, "User marked offline");
            if let Err(err) = self.broadcast_presence().await {
                warn!(conn_id = %conn_id, error = %err, "Failed to broadcast presence");
            }
        } else {
            debug!(
                conn_id = %conn_id,
                user_id = %user_id,
                "Connection replaced by a newer one, user stays online"
            );
        }

        Ok(applied)
    }

    /// Forgets every binding and marks every stored user offline.
    ///
    /// Stored connection ids only mean something to the process that
    /// issued them, so rows left online by a crash are cleared here.
    pub async fn release_all(&self) -> AppResult<u64> {
        self.registry.clear();
        let released = self.users.detach_all().await?;
        if released > 0 {
            info!(released, "Cleared stale presence");
        }
        Ok(released)
    }

    /// Profiles of every online user.
    pub async fn snapshot(&self) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .users
            .find_online()
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    /// Sends `user_list` and `user_count` to every connection.
    pub async fn broadcast_presence(&self) -> AppResult<()> {
        let online = self.snapshot().await?;
        let count = online.len();
        self.pool.broadcast(&ServerEvent::UserList(online));
        self.pool.broadcast(&ServerEvent::UserCount(count));
        Ok(())
    }

    async fn upsert(
        &self,
        conn_id: ConnectionId,
        identity: &VerifiedIdentity,
        name: String,
        avatar: Option<&str>,
    ) -> AppResult<User> {
        if let Some(existing) = self.users.find_by_email(&identity.email).await? {
            return self.attach(existing.id, conn_id, avatar).await;
        }

        let input = CreateUser {
            id: identity.user_id,
            name,
            email: identity.email.clone(),
            password_hash: None,
            avatar: avatar.map(str::to_string),
            connection_id: Some(conn_id),
        };

        match self.users.create(input).await {
            Ok(user) => Ok(user),
            Err(err) if err.is(ErrorKind::Conflict) => {
                // A concurrent registration created the user first.
                let existing = self
                    .users
                    .find_by_email(&identity.email)
                    .await?
                    .ok_or_else(|| AppError::internal("User missing after conflicting insert"))?;
                self.attach(existing.id, conn_id, avatar).await
            }
            Err(err) => Err(err),
        }
    }

    async fn attach(
        &self,
        user_id: UserId,
        conn_id: ConnectionId,
        avatar: Option<&str>,
    ) -> AppResult<User> {
        self.users
            .attach_connection(user_id, conn_id, avatar)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
