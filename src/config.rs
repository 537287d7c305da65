//! Environment-derived configuration.

use serde::Deserialize;

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_email_domain() -> String {
    "vitapstudent.ac.in".to_string()
}

fn default_admin_email() -> String {
    "admin@vitapstudent.ac.in".to_string()
}

fn default_session_ttl_days() -> i64 {
    7
}

fn default_openalex_base_url() -> String {
    "https://api.openalex.org".to_string()
}

fn default_openalex_timeout_secs() -> u64 {
    15
}

fn default_scholar_sync_interval_secs() -> u64 {
    // Six hours between reconciliation passes.
    6 * 60 * 60
}

fn default_shutdown_timeout() -> u64 {
    10
}

/// Loaded from the process environment via figment (see `App::new`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Comma-separated allowed CORS origins. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Option<String>,

    #[serde(default = "default_email_domain")]
    pub allowed_email_domain: String,

    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,

    #[serde(default = "default_openalex_base_url")]
    pub openalex_base_url: String,

    /// OpenAlex institution id (e.g. "I1234567"). The scholar sync is
    /// disabled when unset.
    #[serde(default)]
    pub openalex_institution_id: Option<String>,

    /// Contact email for OpenAlex's polite pool.
    #[serde(default)]
    pub openalex_mailto: Option<String>,

    #[serde(default = "default_openalex_timeout_secs")]
    pub openalex_timeout_secs: u64,

    #[serde(default = "default_scholar_sync_interval_secs")]
    pub scholar_sync_interval_secs: u64,

    /// Seconds to wait for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

impl Config {
    /// Parsed CORS origin list; empty when unconfigured.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            database_url: "postgres://localhost/podium".into(),
            port: default_port(),
            log_level: default_log_level(),
            cors_origins: None,
            allowed_email_domain: default_email_domain(),
            admin_email: default_admin_email(),
            session_ttl_days: default_session_ttl_days(),
            openalex_base_url: default_openalex_base_url(),
            openalex_institution_id: None,
            openalex_mailto: None,
            openalex_timeout_secs: default_openalex_timeout_secs(),
            scholar_sync_interval_secs: default_scholar_sync_interval_secs(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }

    #[test]
    fn cors_list_splits_and_trims() {
        let mut config = minimal();
        config.cors_origins = Some("http://localhost:3000, https://podium.example ,".into());
        assert_eq!(
            config.cors_origin_list(),
            vec!["http://localhost:3000", "https://podium.example"]
        );
    }

    #[test]
    fn cors_list_empty_when_unset() {
        assert!(minimal().cors_origin_list().is_empty());
    }
}
