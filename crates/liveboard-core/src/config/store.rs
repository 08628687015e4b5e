//! Durable store selection.

use serde::{Deserialize, Serialize};

/// Which durable store backs users and messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// PostgreSQL through the configured pool.
    #[default]
    Postgres,
    /// Process-local store; data is lost on restart.
    Memory,
}

/// Store configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Selected provider.
    #[serde(default)]
    pub provider: StoreProvider,
}
