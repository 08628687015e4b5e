//! Connection lifecycle: handles, the outbound pool, the identity registry,
//! handshake authentication and the per-connection dispatcher.

pub mod authenticator;
pub mod handle;
pub mod manager;
pub mod pool;
pub mod registry;

pub use handle::ConnectionHandle;
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
pub use registry::ConnectionRegistry;
