//! Opaque session tokens backed by the `sessions` table.
//!
//! Tokens are random, carry no user data, and expire after the configured
//! TTL. Hot lookups go through the in-memory cache on `AppState`.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

use crate::data::users::User;

/// Generate an opaque session token: 32 random bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("sess_{hex}")
}

/// Create a session for a user; returns `(token, expires_at)`.
pub async fn create_session(
    pool: &PgPool,
    user_id: i32,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>)> {
    let token = generate_token();
    let expires_at = Utc::now() + ttl;

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await
        .context("failed to create session")?;

    Ok((token, expires_at))
}

/// Resolve a token to its user, if the session exists and has not expired.
pub async fn lookup_user(pool: &PgPool, token: &str) -> Result<Option<(User, DateTime<Utc>)>> {
    let row: Option<(i32, DateTime<Utc>)> =
        sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await
            .context("failed to look up session")?;

    let Some((user_id, expires_at)) = row else {
        return Ok(None);
    };
    if expires_at < Utc::now() {
        return Ok(None);
    }

    let user = crate::data::users::get_by_id(pool, user_id).await?;
    Ok(user.map(|u| (u, expires_at)))
}

/// Delete a session (logout). Deleting an unknown token is not an error.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await
        .context("failed to delete session")?;
    Ok(())
}

/// Drop expired sessions. Run at startup; expiry is also enforced on read.
pub async fn purge_expired(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
        .execute(pool)
        .await
        .context("failed to purge expired sessions")?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_prefixed() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.starts_with("sess_"));
        // "sess_" + 64 hex chars
        assert_eq!(a.len(), 5 + 64);
    }
}
