//! Unread accounting for directed messages.

pub mod ledger;

pub use ledger::UnreadLedger;
