//! # liveboard-service
//!
//! Request/response use cases that sit next to the realtime core:
//! account registration and login, and the per-user contact list.
//!
//! Services follow constructor injection; every dependency is handed in
//! as an `Arc` at construction time.

pub mod account;
pub mod contact;

pub use account::{AccountService, LoginOutcome, RegisterAccount};
pub use contact::ContactService;
