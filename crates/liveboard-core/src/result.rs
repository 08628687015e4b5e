//! Convenience result type alias for LiveBoard.

use crate::error::AppError;

/// A specialized `Result` type for LiveBoard operations.
pub type AppResult<T> = Result<T, AppError>;
