//! Message domain entities.

pub mod model;
pub mod view;

pub use model::{CreateMessage, Message};
pub use view::{ChatMessage, PrivateChatMessage, UnreadCount};
