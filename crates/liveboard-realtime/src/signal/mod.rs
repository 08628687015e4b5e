//! Ephemeral signals that are never stored.

pub mod relay;

pub use relay::SignalRelay;
