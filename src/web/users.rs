//! Profile update handler.

use axum::extract::State;
use axum::response::Json;

use crate::data::users::{self, ProfilePatch, UserResponse};
use crate::state::AppState;
use crate::web::auth::CurrentUser;
use crate::web::error::{ApiError, OptionNotFoundExt, db_error};

/// `PATCH /api/users/me`
///
/// Partial update of display name, picture, rating-category preferences,
/// and free-text interests.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = users::update_profile(&state.db_pool, user.id, &patch)
        .await
        .map_err(|e| db_error("Profile update", e))?
        .or_not_found("User", user.id)?;

    // Cached sessions still hold the old profile; drop them.
    state.session_cache.invalidate_user(user.id);

    Ok(Json(UserResponse::from(&updated)))
}
