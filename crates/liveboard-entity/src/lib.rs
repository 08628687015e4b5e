//! # liveboard-entity
//!
//! Domain records for LiveBoard. `User` and `Message` mirror database rows
//! and derive `sqlx::FromRow`; the remaining types are the public views
//! that travel over REST and WebSocket, serialized with camelCase fields.

pub mod contact;
pub mod message;
pub mod user;

pub use contact::ContactSummary;
pub use message::{ChatMessage, CreateMessage, Message, PrivateChatMessage, UnreadCount};
pub use user::{CreateUser, User, UserProfile};
