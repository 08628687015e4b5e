//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use liveboard_core::types::UserId;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Avatar URL; a generated one is used when absent.
    pub avatar: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Direct message sent over REST.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: UserId,
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

/// Message edit body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}
