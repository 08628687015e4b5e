//! # liveboard-auth
//!
//! Opaque credential handling for LiveBoard.
//!
//! ## Modules
//!
//! - `jwt`: token issuance and verification
//! - `password`: Argon2id password hashing
//! - `identity`: the verified identity produced from a valid token

pub mod identity;
pub mod jwt;
pub mod password;

pub use identity::VerifiedIdentity;
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
