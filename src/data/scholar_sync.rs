//! OpenAlex reconciliation batch: link faculty to author records and import
//! their publication titles.
//!
//! Faculty are processed sequentially; any per-faculty failure (network,
//! non-2xx, unparseable name) is counted and the loop continues. The batch
//! itself only fails on being unable to list faculty at all.

use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::data::faculty::{self, Faculty};
use crate::data::names::{self, AuthorCandidate, MatchError};
use crate::openalex::OpenAlexClient;

/// Per-faculty result of one sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Matched an author and stored their works.
    Updated {
        faculty_id: i32,
        author_id: String,
        works: usize,
    },
    /// Name was all titles; nothing to search for.
    SkippedEmptyName { faculty_id: i32 },
    /// No candidate satisfied any matching rule.
    SkippedNoMatch { faculty_id: i32 },
    /// The external call or the write failed; counted, never fatal.
    Failed { faculty_id: i32 },
}

/// Tally of a full sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncStats {
    pub total: usize,
    pub updated: usize,
    pub skipped_empty_name: usize,
    pub skipped_no_match: usize,
    pub failed: usize,
}

impl SyncStats {
    /// Fold per-faculty outcomes into the batch tally.
    pub fn tally(outcomes: &[SyncOutcome]) -> Self {
        outcomes.iter().fold(
            SyncStats {
                total: outcomes.len(),
                ..SyncStats::default()
            },
            |mut stats, outcome| {
                match outcome {
                    SyncOutcome::Updated { .. } => stats.updated += 1,
                    SyncOutcome::SkippedEmptyName { .. } => stats.skipped_empty_name += 1,
                    SyncOutcome::SkippedNoMatch { .. } => stats.skipped_no_match += 1,
                    SyncOutcome::Failed { .. } => stats.failed += 1,
                }
                stats
            },
        )
    }
}

/// Reconcile one faculty record against OpenAlex.
async fn sync_one(pool: &PgPool, client: &OpenAlexClient, fac: &Faculty) -> Result<SyncOutcome> {
    let cleaned = names::strip_title_prefixes(&fac.name);
    if cleaned.is_empty() {
        debug!(faculty_id = fac.id, name = %fac.name, "Name empty after title stripping, skipping");
        return Ok(SyncOutcome::SkippedEmptyName { faculty_id: fac.id });
    }

    let authors = client.search_authors(&cleaned).await?;
    let candidates: Vec<AuthorCandidate> = authors
        .into_iter()
        .map(|a| AuthorCandidate {
            id: a.id,
            display_name: a.display_name,
        })
        .collect();

    let matched = match names::match_author(&fac.name, &candidates) {
        Ok(Some(m)) => m,
        Ok(None) => {
            debug!(faculty_id = fac.id, name = %fac.name, "No author candidate matched");
            return Ok(SyncOutcome::SkippedNoMatch { faculty_id: fac.id });
        }
        Err(MatchError::NoNameAfterCleaning) => {
            return Ok(SyncOutcome::SkippedEmptyName { faculty_id: fac.id });
        }
    };

    let works = client.list_author_works(&matched.id).await?;
    faculty::set_openalex_author(pool, fac.id, &matched.id).await?;
    let stored = faculty::upsert_faculty_works(pool, fac.id, &works).await?;

    debug!(
        faculty_id = fac.id,
        author_id = %matched.id,
        rule = ?matched.rule,
        works = stored,
        "Faculty reconciled"
    );

    Ok(SyncOutcome::Updated {
        faculty_id: fac.id,
        author_id: matched.id,
        works: works.len(),
    })
}

/// Run a full reconciliation pass over all faculty.
pub async fn run_scholar_sync(pool: &PgPool, client: &OpenAlexClient) -> Result<SyncStats> {
    let all = faculty::list_faculty(pool, None).await?;

    let mut outcomes = Vec::with_capacity(all.len());
    for fac in &all {
        let outcome = match sync_one(pool, client, fac).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(faculty_id = fac.id, name = %fac.name, error = %e, "Scholar sync failed for faculty");
                SyncOutcome::Failed { faculty_id: fac.id }
            }
        };
        outcomes.push(outcome);
    }

    let stats = SyncStats::tally(&outcomes);
    info!(
        total = stats.total,
        updated = stats.updated,
        skipped_empty_name = stats.skipped_empty_name,
        skipped_no_match = stats.skipped_no_match,
        failed = stats.failed,
        "Scholar sync complete"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_each_outcome() {
        let outcomes = vec![
            SyncOutcome::Updated {
                faculty_id: 1,
                author_id: "A1".into(),
                works: 4,
            },
            SyncOutcome::SkippedNoMatch { faculty_id: 2 },
            SyncOutcome::Failed { faculty_id: 3 },
            SyncOutcome::SkippedEmptyName { faculty_id: 4 },
            SyncOutcome::Updated {
                faculty_id: 5,
                author_id: "A2".into(),
                works: 0,
            },
        ];

        let stats = SyncStats::tally(&outcomes);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.updated, 2);
        assert_eq!(stats.skipped_no_match, 1);
        assert_eq!(stats.skipped_empty_name, 1);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn tally_of_nothing_is_zero() {
        assert_eq!(SyncStats::tally(&[]), SyncStats::default());
    }
}
