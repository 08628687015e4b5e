//! Account registration and login.

pub mod service;

pub use service::{AccountService, LoginOutcome, RegisterAccount};
