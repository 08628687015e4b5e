//! Contact list handler.

use axum::Json;
use axum::extract::State;

use liveboard_entity::ContactSummary;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ContactSummary>>>, ApiError> {
    let contacts = state.contacts.list_contacts(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(contacts)))
}
