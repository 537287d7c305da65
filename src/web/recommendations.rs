//! Personalized recommendation handler.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::data::faculty::{self, FacultyResponse};
use crate::data::recommend::{self, FacultyDoc};
use crate::state::AppState;
use crate::web::auth::CurrentUser;
use crate::web::error::{ApiError, db_error};

/// A recommended faculty profile with the computed fields alongside it.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecommendationResponse {
    pub faculty: FacultyResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `GET /api/recommendations`
///
/// Admins never receive recommendations; the exclusion lives here rather
/// than inside the engine.
pub async fn recommendations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RecommendationResponse>>, ApiError> {
    if user.is_admin {
        return Ok(Json(Vec::new()));
    }

    let all = faculty::list_faculty(&state.db_pool, None)
        .await
        .map_err(|e| db_error("List faculty", e))?;
    let mut titles = faculty::work_titles_by_faculty(&state.db_pool)
        .await
        .map_err(|e| db_error("Fetch work titles", e))?;

    let docs: Vec<FacultyDoc> = all
        .iter()
        .map(|f| FacultyDoc {
            stats: f.stats(),
            research_interests: f.research_interests.clone(),
            work_titles: titles.remove(&f.id).unwrap_or_default(),
        })
        .collect();

    let recommendations = recommend::recommend(&user.preferences, &user.ai_interests, &docs);

    let response = recommendations
        .into_iter()
        .map(|rec| RecommendationResponse {
            faculty: FacultyResponse::from(&all[rec.index]),
            compatibility_percentage: rec.compatibility_percentage,
            reason: rec.reason,
        })
        .collect();

    Ok(Json(response))
}
