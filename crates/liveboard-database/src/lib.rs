//! # liveboard-database
//!
//! The durable store boundary. [`store::UserStore`] and
//! [`store::MessageStore`] describe every persistence operation the core
//! needs; [`repositories`] implements them on PostgreSQL and [`memory`]
//! implements them in process.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use repositories::{PgMessageStore, PgUserStore};
pub use store::{MessageStore, UserStore};
