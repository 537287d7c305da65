//! Faculty ranking handler.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::data::faculty::{self, FacultyResponse};
use crate::data::rankings::{RankMethod, rank_scores};
use crate::data::stats::{FacultyStats, RatingCategory};
use crate::state::AppState;
use crate::web::auth::CurrentUser;
use crate::web::error::{ApiError, db_error};

#[derive(Debug, Deserialize)]
pub struct RankingsParams {
    pub department: Option<String>,
    pub category: Option<String>,
    pub method: Option<String>,
}

/// A ranked faculty profile with its score and 1-based rank.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RankingEntry {
    pub faculty: FacultyResponse,
    pub score: f64,
    pub rank: i32,
}

/// `GET /api/rankings?department=&category=&method=`
///
/// Department filtering happens before the global-mean computation, so the
/// Bayesian prior reflects the filtered population. Rankings are hidden
/// from admins; the policy sits here, not in the scorer.
pub async fn rankings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<RankingsParams>,
) -> Result<Json<Vec<RankingEntry>>, ApiError> {
    if user.is_admin {
        return Ok(Json(Vec::new()));
    }

    let category_param = params.category.as_deref().unwrap_or("overall");
    let category = RatingCategory::parse(category_param)
        .ok_or_else(|| ApiError::bad_request(format!("unknown category '{category_param}'")))?;
    let method = RankMethod::parse(params.method.as_deref().unwrap_or("weighted"));

    let all = faculty::list_faculty(&state.db_pool, params.department.as_deref())
        .await
        .map_err(|e| db_error("List faculty", e))?;

    let stats: Vec<FacultyStats> = all.iter().map(|f| f.stats()).collect();
    let ranked = rank_scores(&stats, category, method);

    let response = ranked
        .into_iter()
        .map(|entry| RankingEntry {
            faculty: FacultyResponse::from(&all[entry.index]),
            score: entry.score,
            rank: entry.rank,
        })
        .collect();

    Ok(Json(response))
}
