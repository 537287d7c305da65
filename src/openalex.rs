//! OpenAlex REST client for author reconciliation and works import.
//!
//! Only the two endpoints the scholar sync needs: author search scoped to
//! our institution, and works listed by (author, institution). Every call
//! runs under the client-wide timeout so a stalled upstream can never hang
//! the sync batch.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

/// Page size for author search; candidates are evaluated in result order.
const AUTHOR_PAGE_SIZE: u32 = 25;

/// Page size for cursor-paginated works listing.
const WORKS_PAGE_SIZE: u32 = 100;

/// An author record from the OpenAlex search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAlexAuthor {
    pub id: String,
    pub display_name: String,
    pub works_count: i32,
}

/// A work (publication) attributed to an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAlexWork {
    pub id: String,
    pub title: String,
    pub publication_year: Option<i32>,
    pub work_type: Option<String>,
}

/// Client for the OpenAlex API, scoped to a single institution.
pub struct OpenAlexClient {
    http: reqwest::Client,
    base_url: String,
    institution_id: String,
    /// Contact email for OpenAlex's polite pool, appended when configured.
    mailto: Option<String>,
}

impl OpenAlexClient {
    pub fn new(
        base_url: String,
        institution_id: String,
        mailto: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            institution_id,
            mailto,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url.trim_end_matches('/')))?;
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in params {
                query.append_pair(k, v);
            }
            if let Some(mailto) = &self.mailto {
                query.append_pair("mailto", mailto);
            }
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<serde_json::Value> {
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAlex request failed ({status}): {text}");
        }

        Ok(resp.json().await?)
    }

    /// Search authors by display name, filtered to our institution.
    ///
    /// Returns a single page in the API's relevance order, which is the
    /// order the matcher evaluates candidates in.
    pub async fn search_authors(&self, name: &str) -> Result<Vec<OpenAlexAuthor>> {
        let filter = format!("affiliations.institution.id:{}", self.institution_id);
        let per_page = AUTHOR_PAGE_SIZE.to_string();
        let url = self.endpoint(
            "authors",
            &[("search", name), ("filter", &filter), ("per-page", &per_page)],
        )?;

        let json = self.get_json(url).await?;
        let results = json["results"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Missing results in OpenAlex author response"))?;

        let mut authors = Vec::with_capacity(results.len());
        for entry in results {
            authors.push(OpenAlexAuthor {
                id: entry["id"]
                    .as_str()
                    .ok_or_else(|| anyhow::anyhow!("Missing author id"))?
                    .to_string(),
                display_name: entry["display_name"].as_str().unwrap_or_default().to_string(),
                works_count: entry["works_count"].as_i64().unwrap_or(0) as i32,
            });
        }

        trace!(name, count = authors.len(), "OpenAlex author search");
        Ok(authors)
    }

    /// Fetch all works for an author at our institution, following cursor
    /// pagination to the end.
    pub async fn list_author_works(&self, author_id: &str) -> Result<Vec<OpenAlexWork>> {
        let filter = format!(
            "author.id:{},institutions.id:{}",
            author_id, self.institution_id
        );
        let per_page = WORKS_PAGE_SIZE.to_string();

        let mut all = Vec::new();
        let mut cursor = String::from("*");

        loop {
            let url = self.endpoint(
                "works",
                &[
                    ("filter", &filter),
                    ("per-page", &per_page),
                    ("cursor", &cursor),
                ],
            )?;

            let json = self.get_json(url).await?;
            let results = json["results"]
                .as_array()
                .ok_or_else(|| anyhow::anyhow!("Missing results in OpenAlex works response"))?;

            for entry in results {
                // Works occasionally come back with a null title; those carry
                // no signal for interest matching, skip them.
                let Some(title) = entry["title"].as_str().filter(|t| !t.is_empty()) else {
                    continue;
                };
                all.push(OpenAlexWork {
                    id: entry["id"]
                        .as_str()
                        .ok_or_else(|| anyhow::anyhow!("Missing work id"))?
                        .to_string(),
                    title: title.to_string(),
                    publication_year: entry["publication_year"].as_i64().map(|y| y as i32),
                    work_type: entry["type"].as_str().map(|s| s.to_string()),
                });
            }

            match json["meta"]["next_cursor"].as_str() {
                Some(next) if !results.is_empty() => {
                    cursor = next.to_string();
                    trace!(fetched = all.len(), "OpenAlex works pagination: next page");
                }
                _ => break,
            }
        }

        Ok(all)
    }
}
