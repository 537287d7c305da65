//! Faculty store: directory queries, admin CRUD, demo seeding, per-category
//! aggregate persistence, and OpenAlex work imports.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use ts_rs::TS;

use crate::data::stats::{CategoryStats, FacultyStats, RatingCategory};
use crate::openalex::OpenAlexWork;

/// A faculty row, including the running rating aggregates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Faculty {
    pub id: i32,
    pub name: String,
    pub department: String,
    pub designation: String,
    pub image_url: Option<String>,
    pub research_interests: Option<String>,
    pub openalex_author_id: Option<String>,
    pub avg_teaching: f64,
    pub avg_attendance: f64,
    pub avg_doubt_clarification: f64,
    pub avg_overall: f64,
    pub count_teaching: i32,
    pub count_attendance: i32,
    pub count_doubt_clarification: i32,
    pub count_overall: i32,
    pub created_at: DateTime<Utc>,
}

impl Faculty {
    pub fn stats(&self) -> FacultyStats {
        FacultyStats {
            teaching: CategoryStats {
                average: self.avg_teaching,
                count: self.count_teaching,
            },
            attendance: CategoryStats {
                average: self.avg_attendance,
                count: self.count_attendance,
            },
            doubt_clarification: CategoryStats {
                average: self.avg_doubt_clarification,
                count: self.count_doubt_clarification,
            },
            overall: CategoryStats {
                average: self.avg_overall,
                count: self.count_overall,
            },
        }
    }
}

/// Per-category averages as exposed over the API (rounded at this boundary).
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryAverages {
    pub teaching: f64,
    pub attendance: f64,
    pub doubt_clarification: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryCounts {
    pub teaching: i32,
    pub attendance: i32,
    pub doubt_clarification: i32,
    pub overall: i32,
}

/// Faculty profile shape returned by the public API.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FacultyResponse {
    pub id: i32,
    pub name: String,
    pub department: String,
    pub designation: String,
    pub image_url: Option<String>,
    pub research_interests: Option<String>,
    pub openalex_author_id: Option<String>,
    pub avg_ratings: CategoryAverages,
    pub rating_counts: CategoryCounts,
    pub created_at: DateTime<Utc>,
}

impl From<&Faculty> for FacultyResponse {
    fn from(f: &Faculty) -> Self {
        FacultyResponse {
            id: f.id,
            name: f.name.clone(),
            department: f.department.clone(),
            designation: f.designation.clone(),
            image_url: f.image_url.clone(),
            research_interests: f.research_interests.clone(),
            openalex_author_id: f.openalex_author_id.clone(),
            avg_ratings: CategoryAverages {
                teaching: round2(f.avg_teaching),
                attendance: round2(f.avg_attendance),
                doubt_clarification: round2(f.avg_doubt_clarification),
                overall: round2(f.avg_overall),
            },
            rating_counts: CategoryCounts {
                teaching: f.count_teaching,
                attendance: f.count_attendance,
                doubt_clarification: f.count_doubt_clarification,
                overall: f.count_overall,
            },
            created_at: f.created_at,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

const FACULTY_COLUMNS: &str = "id, name, department, designation, image_url, research_interests, \
     openalex_author_id, avg_teaching, avg_attendance, avg_doubt_clarification, avg_overall, \
     count_teaching, count_attendance, count_doubt_clarification, count_overall, created_at";

/// List faculty, optionally filtered by a case-insensitive department
/// substring.
pub async fn list_faculty(pool: &PgPool, department: Option<&str>) -> Result<Vec<Faculty>> {
    let rows = match department {
        Some(dept) => {
            sqlx::query_as(&format!(
                "SELECT {FACULTY_COLUMNS} FROM faculty WHERE department ILIKE $1 ORDER BY id"
            ))
            .bind(format!("%{dept}%"))
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as(&format!("SELECT {FACULTY_COLUMNS} FROM faculty ORDER BY id"))
                .fetch_all(pool)
                .await
        }
    };
    rows.context("failed to list faculty")
}

pub async fn get_faculty(pool: &PgPool, id: i32) -> Result<Option<Faculty>> {
    sqlx::query_as(&format!("SELECT {FACULTY_COLUMNS} FROM faculty WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch faculty")
}

/// Payload for admin faculty creation (also the CSV import row shape).
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewFaculty {
    pub name: String,
    pub department: String,
    pub designation: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub research_interests: Option<String>,
}

pub async fn create_faculty(pool: &PgPool, new: &NewFaculty) -> Result<Faculty> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO faculty (name, department, designation, image_url, research_interests)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {FACULTY_COLUMNS}
        "#
    ))
    .bind(&new.name)
    .bind(&new.department)
    .bind(&new.designation)
    .bind(&new.image_url)
    .bind(&new.research_interests)
    .fetch_one(pool)
    .await
    .context("failed to create faculty")
}

/// Partial update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FacultyPatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub image_url: Option<String>,
    pub research_interests: Option<String>,
}

pub async fn update_faculty(
    pool: &PgPool,
    id: i32,
    patch: &FacultyPatch,
) -> Result<Option<Faculty>> {
    sqlx::query_as(&format!(
        r#"
        UPDATE faculty SET
            name = COALESCE($2, name),
            department = COALESCE($3, department),
            designation = COALESCE($4, designation),
            image_url = COALESCE($5, image_url),
            research_interests = COALESCE($6, research_interests)
        WHERE id = $1
        RETURNING {FACULTY_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.department)
    .bind(&patch.designation)
    .bind(&patch.image_url)
    .bind(&patch.research_interests)
    .fetch_optional(pool)
    .await
    .context("failed to update faculty")
}

/// Returns false when no such faculty existed.
pub async fn delete_faculty(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete faculty")?;
    Ok(result.rows_affected() > 0)
}

/// Bulk create from an import batch, skipping rows that already exist
/// (matched on the `(name, department)` natural key).
pub async fn batch_insert_faculty(pool: &PgPool, batch: &[NewFaculty]) -> Result<u64> {
    if batch.is_empty() {
        return Ok(0);
    }

    let names: Vec<&str> = batch.iter().map(|f| f.name.as_str()).collect();
    let departments: Vec<&str> = batch.iter().map(|f| f.department.as_str()).collect();
    let designations: Vec<&str> = batch.iter().map(|f| f.designation.as_str()).collect();
    let image_urls: Vec<Option<&str>> = batch.iter().map(|f| f.image_url.as_deref()).collect();
    let interests: Vec<Option<&str>> = batch
        .iter()
        .map(|f| f.research_interests.as_deref())
        .collect();

    let result = sqlx::query(
        r#"
        INSERT INTO faculty (name, department, designation, image_url, research_interests)
        SELECT v.name, v.department, v.designation, v.image_url, v.research_interests
        FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::text[])
            AS v(name, department, designation, image_url, research_interests)
        ON CONFLICT (name, department) DO NOTHING
        "#,
    )
    .bind(&names)
    .bind(&departments)
    .bind(&designations)
    .bind(&image_urls)
    .bind(&interests)
    .execute(pool)
    .await
    .context("failed to batch insert faculty")?;

    Ok(result.rows_affected())
}

/// Lock and load the rating aggregates for one faculty row.
///
/// Must run inside the transaction that will write the updated aggregates
/// back; the row lock is what prevents concurrent submissions for the same
/// faculty from losing updates.
pub async fn stats_for_update(
    tx: &mut Transaction<'_, Postgres>,
    faculty_id: i32,
) -> Result<Option<FacultyStats>> {
    let row: Option<(f64, f64, f64, f64, i32, i32, i32, i32)> = sqlx::query_as(
        r#"
        SELECT avg_teaching, avg_attendance, avg_doubt_clarification, avg_overall,
               count_teaching, count_attendance, count_doubt_clarification, count_overall
        FROM faculty WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(faculty_id)
    .fetch_optional(&mut **tx)
    .await
    .context("failed to lock faculty stats")?;

    Ok(row.map(|(at, aa, ad, ao, ct, ca, cd, co)| FacultyStats {
        teaching: CategoryStats {
            average: at,
            count: ct,
        },
        attendance: CategoryStats {
            average: aa,
            count: ca,
        },
        doubt_clarification: CategoryStats {
            average: ad,
            count: cd,
        },
        overall: CategoryStats {
            average: ao,
            count: co,
        },
    }))
}

/// Persist one category's `(average, count)` pair. Column names come from
/// the category enum, never from user input.
pub async fn store_category_stats(
    tx: &mut Transaction<'_, Postgres>,
    faculty_id: i32,
    category: RatingCategory,
    stats: CategoryStats,
) -> Result<()> {
    let sql = format!(
        "UPDATE faculty SET {} = $2, {} = $3 WHERE id = $1",
        category.avg_column(),
        category.count_column()
    );
    sqlx::query(&sql)
        .bind(faculty_id)
        .bind(stats.average)
        .bind(stats.count)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("failed to store {} stats", category.as_str()))?;
    Ok(())
}

/// Record the reconciled OpenAlex author id on a faculty row.
pub async fn set_openalex_author(pool: &PgPool, faculty_id: i32, author_id: &str) -> Result<()> {
    sqlx::query("UPDATE faculty SET openalex_author_id = $2 WHERE id = $1")
        .bind(faculty_id)
        .bind(author_id)
        .execute(pool)
        .await
        .context("failed to set OpenAlex author id")?;
    Ok(())
}

/// Upsert imported works for one faculty using the UNNEST pattern.
pub async fn upsert_faculty_works(
    pool: &PgPool,
    faculty_id: i32,
    works: &[OpenAlexWork],
) -> Result<u64> {
    if works.is_empty() {
        return Ok(0);
    }

    let openalex_ids: Vec<&str> = works.iter().map(|w| w.id.as_str()).collect();
    let titles: Vec<&str> = works.iter().map(|w| w.title.as_str()).collect();
    let years: Vec<Option<i32>> = works.iter().map(|w| w.publication_year).collect();
    let types: Vec<Option<&str>> = works.iter().map(|w| w.work_type.as_deref()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO faculty_works (faculty_id, openalex_id, title, publication_year, work_type, synced_at)
        SELECT $1, v.openalex_id, v.title, v.publication_year, v.work_type, NOW()
        FROM UNNEST($2::text[], $3::text[], $4::int4[], $5::text[])
            AS v(openalex_id, title, publication_year, work_type)
        ON CONFLICT (faculty_id, openalex_id)
        DO UPDATE SET
            title = EXCLUDED.title,
            publication_year = EXCLUDED.publication_year,
            work_type = EXCLUDED.work_type,
            synced_at = EXCLUDED.synced_at
        "#,
    )
    .bind(faculty_id)
    .bind(&openalex_ids)
    .bind(&titles)
    .bind(&years)
    .bind(&types)
    .execute(pool)
    .await
    .context("failed to upsert faculty works")?;

    Ok(result.rows_affected())
}

/// All imported work titles, grouped by faculty. Feeds the recommendation
/// corpus in one query instead of one per faculty.
pub async fn work_titles_by_faculty(pool: &PgPool) -> Result<HashMap<i32, Vec<String>>> {
    let rows: Vec<(i32, String)> =
        sqlx::query_as("SELECT faculty_id, title FROM faculty_works ORDER BY faculty_id, id")
            .fetch_all(pool)
            .await
            .context("failed to fetch faculty work titles")?;

    let mut map: HashMap<i32, Vec<String>> = HashMap::new();
    for (faculty_id, title) in rows {
        map.entry(faculty_id).or_default().push(title);
    }
    Ok(map)
}

/// The demo directory: 10 faculty per school, seeded idempotently at
/// startup so a fresh deployment has something to rate.
pub fn demo_faculty() -> Vec<NewFaculty> {
    const SCHOOLS: &[(&str, &[&str], &[&str])] = &[
        (
            "SCOPE",
            &[
                "Dr. Ada Lovelace",
                "Prof. Alan Turing",
                "Dr. Grace Hopper",
                "Prof. Donald Knuth",
                "Dr. Linus Torvalds",
                "Prof. Tim Berners-Lee",
                "Dr. Margaret Hamilton",
                "Prof. Dennis Ritchie",
                "Dr. Sophie Wilson",
                "Prof. Guido van Rossum",
            ],
            &["Professor", "Associate Professor", "Assistant Professor", "HOD"],
        ),
        (
            "SENSE",
            &[
                "Dr. Nikola Tesla",
                "Prof. Michael Faraday",
                "Dr. Guglielmo Marconi",
                "Prof. Samuel Morse",
                "Dr. Claude Shannon",
                "Prof. Jack Kilby",
                "Dr. Robert Noyce",
                "Prof. Gordon Moore",
                "Dr. Andrew Grove",
                "Prof. Robert Hall",
            ],
            &["Dean", "Professor", "Associate Professor", "Assistant Professor"],
        ),
        (
            "SMEC",
            &[
                "Dr. Henry Ford",
                "Prof. Karl Benz",
                "Prof. Rudolf Diesel",
                "Dr. James Watt",
                "Prof. George Stephenson",
                "Dr. Isambard Brunel",
                "Prof. Nikolaus Otto",
                "Dr. Elijah McCoy",
                "Prof. Gottlieb Daimler",
                "Dr. Charles Kettering",
            ],
            &["Professor", "HOD", "Associate Professor", "Assistant Professor"],
        ),
        (
            "SAS",
            &[
                "Dr. Marie Curie",
                "Prof. Albert Einstein",
                "Dr. Isaac Newton",
                "Prof. Galileo Galilei",
                "Dr. Richard Feynman",
                "Prof. Stephen Hawking",
                "Dr. Neil deGrasse Tyson",
                "Prof. Rosalind Franklin",
                "Dr. Dmitri Mendeleev",
                "Prof. Louis Pasteur",
            ],
            &["Senior Professor", "Professor", "Associate Professor", "Assistant Professor"],
        ),
        (
            "VSB",
            &[
                "Dr. Peter Drucker",
                "Prof. Adam Smith",
                "Dr. Warren Buffett",
                "Prof. John Keynes",
                "Dr. Michael Porter",
                "Prof. Philip Kotler",
                "Dr. Jack Welch",
                "Prof. Henry Mintzberg",
                "Dr. Jim Collins",
                "Prof. Clayton Christensen",
            ],
            &["Professor", "Dean", "Associate Professor", "Assistant Professor"],
        ),
        (
            "VSL",
            &[
                "Dr. Ruth Bader Ginsburg",
                "Prof. Oliver Wendell Holmes",
                "Dr. Thurgood Marshall",
                "Prof. Sandra Day O'Connor",
                "Dr. William Blackstone",
                "Prof. Hugo Black",
                "Dr. Learned Hand",
                "Prof. Benjamin Cardozo",
                "Dr. John Marshall",
                "Prof. Antonin Scalia",
            ],
            &["Senior Advocate", "Professor", "Associate Professor", "HOD"],
        ),
        (
            "VISH",
            &[
                "Dr. Sigmund Freud",
                "Prof. Carl Jung",
                "Dr. B.F. Skinner",
                "Prof. Jean Piaget",
                "Dr. Noam Chomsky",
                "Prof. Jane Goodall",
                "Dr. Margaret Mead",
                "Prof. Erik Erikson",
                "Dr. Abraham Maslow",
                "Prof. Lev Vygotsky",
            ],
            &["Professor", "Assistant Professor", "Associate Professor", "Dean"],
        ),
    ];

    let mut all = Vec::with_capacity(70);
    for (department, names, designations) in SCHOOLS {
        for (i, name) in names.iter().enumerate() {
            let gender = if i % 2 == 0 { "men" } else { "women" };
            all.push(NewFaculty {
                name: name.to_string(),
                department: department.to_string(),
                designation: designations[i % designations.len()].to_string(),
                image_url: Some(format!(
                    "https://randomuser.me/api/portraits/{gender}/{}.jpg",
                    i + 10
                )),
                research_interests: Some(format!("Research in {department}")),
            });
        }
    }
    all
}

/// Seed the demo directory. Safe to run on every startup.
pub async fn seed_demo_faculty(pool: &PgPool) -> Result<u64> {
    batch_insert_faculty(pool, &demo_faculty()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_directory_has_ten_per_school() {
        let all = demo_faculty();
        assert_eq!(all.len(), 70);

        let mut per_dept: HashMap<&str, usize> = HashMap::new();
        for f in &all {
            *per_dept.entry(f.department.as_str()).or_default() += 1;
        }
        assert_eq!(per_dept.len(), 7);
        assert!(per_dept.values().all(|&n| n == 10));
    }

    #[test]
    fn demo_names_are_unique_within_department() {
        let all = demo_faculty();
        let mut seen = std::collections::HashSet::new();
        for f in &all {
            assert!(
                seen.insert((f.name.clone(), f.department.clone())),
                "duplicate demo faculty {} in {}",
                f.name,
                f.department
            );
        }
    }

    #[test]
    fn response_rounds_averages() {
        let f = Faculty {
            id: 1,
            name: "Dr. Ada Lovelace".into(),
            department: "SCOPE".into(),
            designation: "Professor".into(),
            image_url: None,
            research_interests: None,
            openalex_author_id: None,
            avg_teaching: 3.333333,
            avg_attendance: 0.0,
            avg_doubt_clarification: 0.0,
            avg_overall: 4.666666,
            count_teaching: 3,
            count_attendance: 0,
            count_doubt_clarification: 0,
            count_overall: 3,
            created_at: Utc::now(),
        };
        let resp = FacultyResponse::from(&f);
        assert_eq!(resp.avg_ratings.teaching, 3.33);
        assert_eq!(resp.avg_ratings.overall, 4.67);
    }
}
