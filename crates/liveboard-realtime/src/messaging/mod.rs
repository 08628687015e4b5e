//! Message routing and history.

pub mod history;
pub mod router;

pub use history::{ConversationKey, MessageHistory};
pub use router::MessageRouter;
