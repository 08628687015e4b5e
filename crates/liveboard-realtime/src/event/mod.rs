//! The JSON event protocol spoken over WebSocket text frames.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{ClientEvent, RegisterProfile, ServerEvent};
