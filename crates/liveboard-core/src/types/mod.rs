//! Shared value types.

pub mod id;
pub mod response;

pub use id::*;
pub use response::{ApiErrorResponse, ApiResponse};
