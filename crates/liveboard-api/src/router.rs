//! Route definitions for the LiveBoard HTTP API.
//!
//! REST routes are mounted under `/api`; the socket lives at `/ws`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(message_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Account endpoints: register, login
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(handlers::users::list_contacts))
}

/// Message endpoints: global history, conversations, direct send, edit, delete
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(handlers::messages::recent_broadcasts).post(handlers::messages::send_direct),
        )
        .route(
            "/messages/with/{user_id}",
            get(handlers::messages::conversation),
        )
        .route(
            "/messages/{message_id}",
            put(handlers::messages::edit).delete(handlers::messages::delete),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
