//! Admin endpoints: CSV faculty import and the manual scholar-sync trigger.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use ts_rs::TS;

use crate::data::faculty::{self, NewFaculty};
use crate::data::scholar_sync;
use crate::state::AppState;
use crate::web::auth::AdminUser;
use crate::web::error::{ApiError, db_error};

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImportResponse {
    pub parsed: usize,
    pub inserted: u64,
    pub skipped_invalid: usize,
}

/// Parse a faculty CSV export. Expected header:
/// `name,department,designation,research_interests` (interests optional).
fn parse_faculty_csv(body: &str) -> Result<(Vec<NewFaculty>, usize), csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    let mut skipped_invalid = 0usize;

    for record in reader.records() {
        let record = record?;
        let name = record.get(0).unwrap_or_default();
        let department = record.get(1).unwrap_or_default();
        let designation = record.get(2).unwrap_or_default();
        if name.is_empty() || department.is_empty() {
            skipped_invalid += 1;
            continue;
        }
        rows.push(NewFaculty {
            name: name.to_string(),
            department: department.to_string(),
            designation: if designation.is_empty() {
                "Faculty".to_string()
            } else {
                designation.to_string()
            },
            image_url: None,
            research_interests: record.get(3).filter(|s| !s.is_empty()).map(str::to_string),
        });
    }

    Ok((rows, skipped_invalid))
}

/// `POST /api/admin/faculty/import`
///
/// Body is raw CSV. Rows whose `(name, department)` already exists are
/// skipped by the insert, not treated as errors.
pub async fn import_faculty(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let (rows, skipped_invalid) = parse_faculty_csv(&body)
        .map_err(|e| ApiError::bad_request(format!("malformed CSV: {e}")))?;

    if rows.is_empty() {
        return Err(ApiError::bad_request("no importable rows in CSV"));
    }

    let inserted = faculty::batch_insert_faculty(&state.db_pool, &rows)
        .await
        .map_err(|e| db_error("Faculty import", e))?;

    info!(
        parsed = rows.len(),
        inserted, skipped_invalid, "Faculty CSV import complete"
    );

    Ok(Json(ImportResponse {
        parsed: rows.len(),
        inserted,
        skipped_invalid,
    }))
}

/// `POST /api/admin/scholar-sync`
///
/// Runs a full reconciliation pass inline and returns the tally.
pub async fn run_scholar_sync(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(client) = &state.openalex else {
        return Err(ApiError::bad_request(
            "scholar sync is disabled: no OpenAlex institution configured",
        ));
    };

    let stats = scholar_sync::run_scholar_sync(&state.db_pool, client)
        .await
        .map_err(|e| db_error("Scholar sync", e))?;

    Ok(Json(json!({ "stats": stats })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_csv() {
        let csv = "name,department,designation,research_interests\n\
                   Dr. Jane Doe,SCOPE,Professor,Machine learning\n\
                   Prof. Alan Turing,SCOPE,Professor,\n";
        let (rows, skipped) = parse_faculty_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(skipped, 0);
        assert_eq!(rows[0].name, "Dr. Jane Doe");
        assert_eq!(rows[0].research_interests.as_deref(), Some("Machine learning"));
        assert_eq!(rows[1].research_interests, None);
    }

    #[test]
    fn skips_rows_missing_required_fields() {
        let csv = "name,department,designation\n\
                   ,SCOPE,Professor\n\
                   Dr. Jane Doe,,Professor\n\
                   Dr. Ada Lovelace,SCOPE,HOD\n";
        let (rows, skipped) = parse_faculty_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(skipped, 2);
        assert_eq!(rows[0].name, "Dr. Ada Lovelace");
    }

    #[test]
    fn missing_designation_gets_default() {
        let csv = "name,department\nDr. Jane Doe,SCOPE\n";
        let (rows, _) = parse_faculty_csv(csv).unwrap();
        assert_eq!(rows[0].designation, "Faculty");
    }
}
