//! Response DTOs.

use serde::{Deserialize, Serialize};

use liveboard_core::types::MessageId;
use liveboard_realtime::metrics::MetricsSnapshot;

pub use liveboard_core::types::ApiResponse;

/// Liveness plus connection counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Connections that completed `register_user`.
    pub registered: usize,
    pub metrics: MetricsSnapshot,
}

/// Acknowledges a deleted message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub id: MessageId,
}
