//! Rating submission handlers.

use axum::extract::{Path, State};
use axum::response::Json;

use crate::data::ratings::{self, RatingRecord, RatingSubmission};
use crate::state::AppState;
use crate::web::auth::CurrentUser;
use crate::web::error::{ApiError, db_error};

/// `POST /api/faculty/{id}/ratings`
///
/// First submission creates the record; resubmission revises it in place.
/// The faculty aggregates are updated for exactly the categories included.
pub async fn submit_rating(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(faculty_id): Path<i32>,
    Json(submission): Json<RatingSubmission>,
) -> Result<Json<RatingRecord>, ApiError> {
    submission.validate().map_err(ApiError::bad_request)?;

    let record = ratings::submit_rating(&state.db_pool, faculty_id, user.id, &submission)
        .await
        .map_err(|e| db_error("Submit rating", e))?
        .ok_or_else(|| ApiError::not_found("Faculty", faculty_id))?;

    Ok(Json(record))
}

/// `GET /api/faculty/{id}/ratings/me`
///
/// The caller's own rating for this faculty, or `null` when they have not
/// rated yet.
pub async fn my_rating(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(faculty_id): Path<i32>,
) -> Result<Json<Option<RatingRecord>>, ApiError> {
    let record = ratings::get_rating(&state.db_pool, faculty_id, user.id)
        .await
        .map_err(|e| db_error("Get rating", e))?;
    Ok(Json(record))
}
