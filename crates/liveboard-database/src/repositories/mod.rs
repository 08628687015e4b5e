//! PostgreSQL implementations of the store traits.

pub mod message;
pub mod user;

pub use message::PgMessageStore;
pub use user::PgUserStore;

use liveboard_core::error::{AppError, ErrorKind};

/// Map a sqlx error into the store-unavailable kind with context.
pub(crate) fn store_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::StoreUnavailable, context, e)
}
