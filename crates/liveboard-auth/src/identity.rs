//! Identity established once at connection or request time.

use serde::{Deserialize, Serialize};

use liveboard_core::types::UserId;

use crate::jwt::Claims;

/// Who a connection or request belongs to, taken from a verified token.
///
/// Only [`crate::JwtDecoder`] produces one from untrusted input; it is then
/// passed explicitly to everything that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// The authenticated user.
    pub user_id: UserId,
    /// Email the token was issued for.
    pub email: String,
    /// Display name at issue time.
    pub name: String,
}

impl From<Claims> for VerifiedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}
