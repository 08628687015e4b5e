//! # liveboard-realtime
//!
//! The presence and message-coordination core of LiveBoard:
//!
//! - Connection registry (connection id to user id) and outbound pool
//! - Presence coordination with race-safe disconnects
//! - Global and direct message routing
//! - Unread ledger and read receipts
//! - Best-effort typing relay
//! - The JSON event protocol and the per-connection dispatcher
//!
//! Every component is owned by a [`ChatEngine`]; nothing is global, so two
//! engines in one process never share state.

pub mod connection;
pub mod event;
pub mod messaging;
pub mod metrics;
pub mod presence;
pub mod server;
pub mod signal;
pub mod unread;

pub use connection::manager::ConnectionManager;
pub use connection::registry::ConnectionRegistry;
pub use event::types::{ClientEvent, ServerEvent};
pub use messaging::history::ConversationKey;
pub use messaging::router::MessageRouter;
pub use presence::coordinator::PresenceCoordinator;
pub use server::ChatEngine;
pub use signal::relay::SignalRelay;
pub use unread::ledger::UnreadLedger;
