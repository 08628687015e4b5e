//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per connection; events beyond it are dropped.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Broadcast messages replayed to a socket when it connects.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Broadcast messages returned by `GET /api/messages`.
    #[serde(default = "default_rest_history_limit")]
    pub rest_history_limit: usize,
    /// Maximum message length in characters after trimming.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Largest inbound text frame accepted, in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Hard cap on a WebSocket message. Kept above `max_frame_bytes` so an
    /// oversized frame reaches the engine and gets a validation error
    /// instead of tearing down the socket.
    #[serde(default = "default_max_socket_bytes")]
    pub max_socket_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            history_limit: default_history_limit(),
            rest_history_limit: default_rest_history_limit(),
            max_message_length: default_max_message_length(),
            max_frame_bytes: default_max_frame_bytes(),
            max_socket_bytes: default_max_socket_bytes(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_history_limit() -> usize {
    150
}

fn default_rest_history_limit() -> usize {
    100
}

fn default_max_message_length() -> usize {
    4000
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

fn default_max_socket_bytes() -> usize {
    1024 * 1024
}
