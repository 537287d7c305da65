//! Faculty comment handlers.

use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::json;

use crate::data::comments::{self, Comment, NewComment};
use crate::state::AppState;
use crate::web::auth::CurrentUser;
use crate::web::error::{ApiError, OptionNotFoundExt, db_error};

/// `GET /api/faculty/{id}/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    Path(faculty_id): Path<i32>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let rows = comments::list_for_faculty(&state.db_pool, faculty_id)
        .await
        .map_err(|e| db_error("List comments", e))?;
    Ok(Json(rows))
}

/// `POST /api/faculty/{id}/comments`
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(faculty_id): Path<i32>,
    Json(new): Json<NewComment>,
) -> Result<Json<Comment>, ApiError> {
    if new.content.trim().is_empty() {
        return Err(ApiError::bad_request("comment content is required"));
    }
    let comment = comments::create_comment(&state.db_pool, faculty_id, user.id, &new)
        .await
        .map_err(|e| db_error("Create comment", e))?;
    Ok(Json(comment))
}

/// `DELETE /api/comments/{id}`
///
/// Only the author or an admin may delete.
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let author_id = comments::get_author(&state.db_pool, comment_id)
        .await
        .map_err(|e| db_error("Get comment", e))?
        .or_not_found("Comment", comment_id)?;

    if author_id != user.id && !user.is_admin {
        return Err(ApiError::forbidden("not authorized to delete this comment"));
    }

    comments::delete_comment(&state.db_pool, comment_id)
        .await
        .map_err(|e| db_error("Delete comment", e))?;
    Ok(Json(json!({"message": "comment deleted"})))
}
