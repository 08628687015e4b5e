//! Account handlers: register, login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use liveboard_entity::UserProfile;
use liveboard_service::{LoginOutcome, RegisterAccount};

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), ApiError> {
    let profile = state
        .accounts
        .register(RegisterAccount {
            name: req.name,
            email: req.email,
            password: req.password,
            avatar: req.avatar,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(profile))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginOutcome>>, ApiError> {
    let outcome = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
