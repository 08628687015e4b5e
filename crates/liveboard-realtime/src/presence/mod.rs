//! Presence: who is online and through which connection.

pub mod coordinator;

pub use coordinator::PresenceCoordinator;
