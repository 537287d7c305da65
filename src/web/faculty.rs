//! Faculty directory and admin CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;

use crate::data::faculty::{self, FacultyPatch, FacultyResponse, NewFaculty};
use crate::state::AppState;
use crate::web::auth::AdminUser;
use crate::web::error::{ApiError, OptionNotFoundExt, db_error};

#[derive(Debug, Deserialize)]
pub struct FacultyListParams {
    pub department: Option<String>,
}

/// `GET /api/faculty?department=`
pub async fn list_faculty(
    State(state): State<AppState>,
    Query(params): Query<FacultyListParams>,
) -> Result<Json<Vec<FacultyResponse>>, ApiError> {
    let rows = faculty::list_faculty(&state.db_pool, params.department.as_deref())
        .await
        .map_err(|e| db_error("List faculty", e))?;
    Ok(Json(rows.iter().map(FacultyResponse::from).collect()))
}

/// `GET /api/faculty/{id}`
pub async fn get_faculty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FacultyResponse>, ApiError> {
    let fac = faculty::get_faculty(&state.db_pool, id)
        .await
        .map_err(|e| db_error("Get faculty", e))?
        .or_not_found("Faculty", id)?;
    Ok(Json(FacultyResponse::from(&fac)))
}

/// `POST /api/faculty` (admin)
pub async fn create_faculty(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(new): Json<NewFaculty>,
) -> Result<Json<FacultyResponse>, ApiError> {
    if new.name.trim().is_empty() || new.department.trim().is_empty() {
        return Err(ApiError::bad_request("name and department are required"));
    }
    let fac = faculty::create_faculty(&state.db_pool, &new)
        .await
        .map_err(|e| db_error("Create faculty", e))?;
    Ok(Json(FacultyResponse::from(&fac)))
}

/// `PATCH /api/faculty/{id}` (admin)
pub async fn update_faculty(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i32>,
    Json(patch): Json<FacultyPatch>,
) -> Result<Json<FacultyResponse>, ApiError> {
    let fac = faculty::update_faculty(&state.db_pool, id, &patch)
        .await
        .map_err(|e| db_error("Update faculty", e))?
        .or_not_found("Faculty", id)?;
    Ok(Json(FacultyResponse::from(&fac)))
}

/// `DELETE /api/faculty/{id}` (admin)
pub async fn delete_faculty(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = faculty::delete_faculty(&state.db_pool, id)
        .await
        .map_err(|e| db_error("Delete faculty", e))?;
    if !deleted {
        return Err(ApiError::not_found("Faculty", id));
    }
    Ok(Json(json!({"message": "faculty deleted"})))
}
