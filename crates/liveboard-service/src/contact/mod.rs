//! Contact list with last message and unread summary.

pub mod service;

pub use service::ContactService;
