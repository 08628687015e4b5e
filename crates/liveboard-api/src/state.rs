//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use liveboard_auth::{JwtDecoder, JwtEncoder, PasswordHasher};
use liveboard_core::config::AppConfig;
use liveboard_database::{MessageStore, UserStore};
use liveboard_realtime::ChatEngine;
use liveboard_realtime::connection::authenticator::WsAuthenticator;
use liveboard_service::{AccountService, ContactService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT verification for Bearer headers
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Handshake authentication for `/ws`
    pub authenticator: Arc<WsAuthenticator>,

    // ── Realtime ─────────────────────────────────────────────
    /// Presence and message-coordination engine
    pub engine: ChatEngine,

    // ── Services ─────────────────────────────────────────────
    pub accounts: Arc<AccountService>,
    pub contacts: Arc<ContactService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}

impl AppState {
    /// Wires the engine and services over the given stores.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let authenticator = Arc::new(WsAuthenticator::new(jwt_decoder.clone()));

        let engine = ChatEngine::new(config.realtime.clone(), users.clone(), messages.clone());
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            Arc::new(PasswordHasher::new()),
            jwt_encoder,
        ));
        let contacts = Arc::new(ContactService::new(users, messages));

        Self {
            config: Arc::new(config),
            jwt_decoder,
            authenticator,
            engine,
            accounts,
            contacts,
        }
    }
}
