//! Rating records and the transactional submission flow.
//!
//! One record per (faculty, user), enforced by a unique constraint.
//! Submission locks the faculty row, folds each included category through
//! the running-average aggregator, and writes record + aggregates in one
//! transaction so concurrent submissions for the same faculty cannot lose
//! updates.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use ts_rs::TS;

use crate::data::faculty::{stats_for_update, store_category_stats};
use crate::data::stats::RatingCategory;

/// A stored rating record. Category values are 1-5; `overall` is always
/// present, the rest are optional.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RatingRecord {
    pub id: i32,
    pub faculty_id: i32,
    pub user_id: i32,
    pub teaching: Option<i16>,
    pub attendance: Option<i16>,
    pub doubt_clarification: Option<i16>,
    pub overall: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RatingRecord {
    fn value(&self, category: RatingCategory) -> Option<i16> {
        match category {
            RatingCategory::Teaching => self.teaching,
            RatingCategory::Attendance => self.attendance,
            RatingCategory::DoubtClarification => self.doubt_clarification,
            RatingCategory::Overall => Some(self.overall),
        }
    }
}

/// An incoming submission. `overall` is mandatory; omitted categories are
/// left untouched, including on resubmission.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RatingSubmission {
    #[serde(default)]
    pub teaching: Option<i16>,
    #[serde(default)]
    pub attendance: Option<i16>,
    #[serde(default)]
    pub doubt_clarification: Option<i16>,
    pub overall: i16,
}

impl RatingSubmission {
    fn value(&self, category: RatingCategory) -> Option<i16> {
        match category {
            RatingCategory::Teaching => self.teaching,
            RatingCategory::Attendance => self.attendance,
            RatingCategory::DoubtClarification => self.doubt_clarification,
            RatingCategory::Overall => Some(self.overall),
        }
    }

    /// All provided values must sit on the 1-5 scale.
    pub fn validate(&self) -> Result<(), String> {
        for category in RatingCategory::ALL {
            if let Some(v) = self.value(category)
                && !(1..=5).contains(&v)
            {
                return Err(format!(
                    "{} must be between 1 and 5, got {v}",
                    category.as_str()
                ));
            }
        }
        Ok(())
    }
}

pub async fn get_rating(
    pool: &PgPool,
    faculty_id: i32,
    user_id: i32,
) -> Result<Option<RatingRecord>> {
    sqlx::query_as(
        "SELECT id, faculty_id, user_id, teaching, attendance, doubt_clarification, overall, \
         created_at, updated_at \
         FROM ratings WHERE faculty_id = $1 AND user_id = $2",
    )
    .bind(faculty_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch rating")
}

/// Submit or revise a rating.
///
/// Returns `None` when the faculty record does not exist (the caller
/// decides how to report that). On success the stored record reflects the
/// merge of this submission over any previous one, and the faculty
/// aggregates have been updated for exactly the categories included here.
pub async fn submit_rating(
    pool: &PgPool,
    faculty_id: i32,
    user_id: i32,
    submission: &RatingSubmission,
) -> Result<Option<RatingRecord>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    // Row lock on the faculty aggregates for the whole read-modify-write.
    let Some(stats) = stats_for_update(&mut tx, faculty_id).await? else {
        return Ok(None);
    };

    let existing: Option<RatingRecord> = sqlx::query_as(
        "SELECT id, faculty_id, user_id, teaching, attendance, doubt_clarification, overall, \
         created_at, updated_at \
         FROM ratings WHERE faculty_id = $1 AND user_id = $2",
    )
    .bind(faculty_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to fetch existing rating")?;

    let record: RatingRecord = match &existing {
        Some(previous) => {
            // Update in place; omitted categories keep their stored values.
            sqlx::query_as(
                r#"
                UPDATE ratings SET
                    teaching = COALESCE($3, teaching),
                    attendance = COALESCE($4, attendance),
                    doubt_clarification = COALESCE($5, doubt_clarification),
                    overall = $6,
                    updated_at = NOW()
                WHERE id = $1 AND user_id = $2
                RETURNING id, faculty_id, user_id, teaching, attendance, doubt_clarification,
                          overall, created_at, updated_at
                "#,
            )
            .bind(previous.id)
            .bind(user_id)
            .bind(submission.teaching)
            .bind(submission.attendance)
            .bind(submission.doubt_clarification)
            .bind(submission.overall)
            .fetch_one(&mut *tx)
            .await
            .context("failed to update rating")?
        }
        None => sqlx::query_as(
            r#"
            INSERT INTO ratings (faculty_id, user_id, teaching, attendance, doubt_clarification, overall)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, faculty_id, user_id, teaching, attendance, doubt_clarification,
                      overall, created_at, updated_at
            "#,
        )
        .bind(faculty_id)
        .bind(user_id)
        .bind(submission.teaching)
        .bind(submission.attendance)
        .bind(submission.doubt_clarification)
        .bind(submission.overall)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert rating")?,
    };

    // Fold each included category through the aggregator. Categories absent
    // from this submission are left untouched, even on revision.
    for category in RatingCategory::ALL {
        let Some(new_value) = submission.value(category) else {
            continue;
        };
        let old_value = existing.as_ref().and_then(|r| r.value(category));
        let updated = stats.get(category).apply(new_value, old_value);
        store_category_stats(&mut tx, faculty_id, category, updated).await?;
    }

    tx.commit().await.context("failed to commit rating")?;
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(overall: i16) -> RatingSubmission {
        RatingSubmission {
            teaching: None,
            attendance: None,
            doubt_clarification: None,
            overall,
        }
    }

    #[test]
    fn validate_accepts_scale_values() {
        assert!(submission(1).validate().is_ok());
        assert!(submission(5).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_scale() {
        assert!(submission(0).validate().is_err());
        assert!(submission(6).validate().is_err());

        let mut s = submission(3);
        s.teaching = Some(9);
        let err = s.validate().unwrap_err();
        assert!(err.contains("teaching"));
    }

    #[test]
    fn overall_is_always_present_in_values() {
        let s = submission(4);
        assert_eq!(s.value(RatingCategory::Overall), Some(4));
        assert_eq!(s.value(RatingCategory::Teaching), None);
    }
}
