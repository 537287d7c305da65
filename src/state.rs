//! Application state shared across the web handlers and background sync.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;

use crate::data::users::User;
use crate::openalex::OpenAlexClient;

/// A cached session entry; dropped lazily once expired.
#[derive(Debug, Clone)]
struct CachedSession {
    user: User,
    expires_at: DateTime<Utc>,
}

/// In-memory session lookup cache over the `sessions` table.
///
/// Entries expire with their session; writes go through the table first and
/// are only mirrored here.
#[derive(Clone, Default)]
pub struct SessionCache {
    inner: Arc<DashMap<String, CachedSession>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<User> {
        let entry = self.inner.get(token)?;
        if entry.expires_at < Utc::now() {
            drop(entry);
            self.inner.remove(token);
            return None;
        }
        Some(entry.user.clone())
    }

    pub fn insert(&self, token: &str, user: User, expires_at: DateTime<Utc>) {
        self.inner
            .insert(token.to_string(), CachedSession { user, expires_at });
    }

    pub fn invalidate(&self, token: &str) {
        self.inner.remove(token);
    }

    /// Drop every cached session for a user, e.g. after a profile update.
    pub fn invalidate_user(&self, user_id: i32) {
        self.inner.retain(|_, entry| entry.user.id != user_id);
    }
}

/// Authentication policy derived from config.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Only emails under this domain may log in.
    pub allowed_email_domain: String,
    /// The account with this email is the admin.
    pub admin_email: String,
    pub session_ttl: chrono::Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    /// Present only when an OpenAlex institution id is configured.
    pub openalex: Option<Arc<OpenAlexClient>>,
    pub session_cache: SessionCache,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(db_pool: PgPool, openalex: Option<Arc<OpenAlexClient>>, auth: AuthSettings) -> Self {
        Self {
            db_pool,
            openalex,
            session_cache: SessionCache::new(),
            auth,
        }
    }
}
