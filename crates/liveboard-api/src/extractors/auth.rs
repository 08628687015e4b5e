//! `AuthUser` extractor: pulls the JWT from the Authorization header and
//! verifies it.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use liveboard_auth::VerifiedIdentity;
use liveboard_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified caller of an authenticated route.
#[derive(Debug, Clone)]
pub struct AuthUser(pub VerifiedIdentity);

impl std::ops::Deref for AuthUser {
    type Target = VerifiedIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        Ok(AuthUser(state.jwt_decoder.verify(token)?))
    }
}
