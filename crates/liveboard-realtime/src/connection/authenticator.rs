//! WebSocket handshake authentication.

use std::sync::Arc;

use liveboard_auth::{JwtDecoder, VerifiedIdentity};
use liveboard_core::error::AppError;

/// Verifies the handshake token before a socket is upgraded.
#[derive(Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates the `token` query parameter.
    pub fn authenticate(&self, token: Option<&str>) -> Result<VerifiedIdentity, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Missing token"))?;

        self.decoder.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveboard_auth::JwtEncoder;
    use liveboard_core::config::AuthConfig;
    use liveboard_core::error::ErrorKind;
    use liveboard_core::types::UserId;

    #[test]
    fn test_missing_or_blank_token_is_unauthorized() {
        let auth = WsAuthenticator::new(Arc::new(JwtDecoder::new(&AuthConfig::default())));
        assert_eq!(auth.authenticate(None).unwrap_err().kind, ErrorKind::Unauthorized);
        assert_eq!(auth.authenticate(Some("  ")).unwrap_err().kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let config = AuthConfig::default();
        let user_id = UserId::new();
        let issued = JwtEncoder::new(&config)
            .issue(user_id, "bob@example.com", "Bob")
            .expect("issue");
        let auth = WsAuthenticator::new(Arc::new(JwtDecoder::new(&config)));
        let identity = auth.authenticate(Some(&issued.token)).expect("authenticate");
        assert_eq!(identity.user_id, user_id);
    }
}
