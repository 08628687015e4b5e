//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an empty configuration is a
//! valid single-node development setup.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod realtime;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::store::{StoreConfig, StoreProvider};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "LIVEBOARD";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Durable store selection.
    #[serde(default)]
    pub store: StoreConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml`, an environment-specific overlay
    /// `config/{env}.toml` and environment variables prefixed with
    /// `LIVEBOARD__` (for example `LIVEBOARD__SERVER__PORT=5000`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.realtime.channel_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.channel_buffer_size must be greater than zero",
            ));
        }
        if self.realtime.max_message_length == 0 {
            return Err(AppError::configuration(
                "realtime.max_message_length must be greater than zero",
            ));
        }
        if self.realtime.max_socket_bytes <= self.realtime.max_frame_bytes {
            return Err(AppError::configuration(
                "realtime.max_socket_bytes must be greater than realtime.max_frame_bytes",
            ));
        }
        if self.store.provider == StoreProvider::Postgres && self.database.url.trim().is_empty() {
            return Err(AppError::configuration(
                "database.url is required when store.provider is \"postgres\"",
            ));
        }
        Ok(())
    }
}
