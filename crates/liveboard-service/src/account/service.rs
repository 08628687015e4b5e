//! Account service: password registration and credential login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tracing::{info, warn};

use liveboard_auth::{JwtEncoder, PasswordHasher};
use liveboard_core::error::AppError;
use liveboard_core::result::AppResult;
use liveboard_core::types::UserId;
use liveboard_database::UserStore;
use liveboard_entity::{CreateUser, UserProfile};

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

/// Input for a new password account. Field checks happen at the HTTP edge.
#[derive(Debug, Clone)]
pub struct RegisterAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    /// Bearer token, also accepted by the WebSocket handshake.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/// Creates accounts and exchanges credentials for tokens.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish()
    }
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            users,
            hasher,
            encoder,
        }
    }

    /// Registers a password account. A taken email is a conflict.
    pub async fn register(&self, input: RegisterAccount) -> AppResult<UserProfile> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_string();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already exists"));
        }

        let password_hash = self.hasher.hash_password(&input.password)?;
        let avatar = input
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default_avatar(&name));

        let user = self
            .users
            .create(CreateUser {
                id: UserId::new(),
                name,
                email,
                password_hash: Some(password_hash),
                avatar: Some(avatar),
                connection_id: None,
            })
            .await?;

        info!(user_id = %user.id, "Account registered");
        Ok(UserProfile::from(user))
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email, socket-only accounts and wrong passwords all fail the
    /// same way.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let invalid = || AppError::unauthorized("Invalid credentials");

        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or_else(invalid)?;
        let Some(hash) = user.password_hash.as_deref() else {
            warn!(user_id = %user.id, "Login attempt on account without password");
            return Err(invalid());
        };
        if !self.hasher.verify_password(password, hash)? {
            return Err(invalid());
        }

        let issued = self.encoder.issue(user.id, &user.email, &user.name)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserProfile::from(user),
        })
    }
}

/// Generated-initials avatar for users who did not supply one.
pub fn default_avatar(name: &str) -> String {
    format!(
        "{AVATAR_SERVICE}?name={}&background=random",
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveboard_auth::JwtDecoder;
    use liveboard_core::config::AuthConfig;
    use liveboard_core::error::ErrorKind;
    use liveboard_database::MemoryStore;

    fn service() -> (AccountService, JwtDecoder) {
        let config = AuthConfig {
            jwt_secret: "account-test-secret".to_string(),
            ..AuthConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(
            store,
            Arc::new(PasswordHasher::new()),
            Arc::new(JwtEncoder::new(&config)),
        );
        (service, JwtDecoder::new(&config))
    }

    fn account(email: &str) -> RegisterAccount {
        RegisterAccount {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_default_avatar_encodes_name() {
        assert_eq!(
            default_avatar("Ada Lovelace"),
            "https://ui-avatars.com/api/?name=Ada%20Lovelace&background=random"
        );
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, decoder) = service();

        let profile = service.register(account("ada@example.com")).await.unwrap();
        assert_eq!(profile.name, "Ada Lovelace");
        assert!(profile.avatar.unwrap().starts_with(AVATAR_SERVICE));

        let outcome = service
            .login("ada@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(outcome.user.id, profile.id);

        let identity = decoder.verify(&outcome.token).unwrap();
        assert_eq!(identity.user_id, profile.id);
        assert_eq!(identity.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (service, _) = service();
        service.register(account("ada@example.com")).await.unwrap();

        let err = service
            .register(account("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let (service, _) = service();
        service.register(account("ada@example.com")).await.unwrap();

        let wrong_password = service
            .login("ada@example.com", "wrong")
            .await
            .unwrap_err();
        let unknown = service
            .login("nobody@example.com", "correct horse")
            .await
            .unwrap_err();

        assert!(wrong_password.is(ErrorKind::Unauthorized));
        assert_eq!(wrong_password.message, unknown.message);
    }
}
