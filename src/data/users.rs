//! User accounts.
//!
//! Accounts are auto-provisioned on first login with an Argon2id-hashed
//! password; the admin flag derives from the configured admin email at
//! creation time. The password hash never leaves this module's row type.

use anyhow::{Context, Result};
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use ts_rs::TS;

/// A user row. Not serialized directly; see [`UserResponse`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub preferences: Vec<String>,
    pub ai_interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// User shape exposed over the API (no credentials).
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub is_admin: bool,
    pub preferences: Vec<String>,
    pub ai_interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        UserResponse {
            id: u.id,
            email: u.email.clone(),
            name: u.name.clone(),
            picture: u.picture.clone(),
            is_admin: u.is_admin,
            preferences: u.preferences.clone(),
            ai_interests: u.ai_interests.clone(),
            created_at: u.created_at,
        }
    }
}

/// Hash a password with Argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Constant-result password check; any parse or verify failure is `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

const USER_COLUMNS: &str =
    "id, email, name, picture, password_hash, is_admin, preferences, ai_interests, created_at";

pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by email")
}

pub async fn get_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by id")
}

/// Create an account. The display name defaults to the capitalized email
/// local part, matching the login auto-provisioning flow.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<User> {
    let local = email.split('@').next().unwrap_or(email);
    let mut name = local.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    sqlx::query_as(&format!(
        r#"
        INSERT INTO users (email, name, password_hash, is_admin)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(email)
    .bind(&name)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_one(pool)
    .await
    .context("failed to create user")
}

/// Partial profile update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub preferences: Option<Vec<String>>,
    pub ai_interests: Option<Vec<String>>,
}

pub async fn update_profile(pool: &PgPool, user_id: i32, patch: &ProfilePatch) -> Result<Option<User>> {
    sqlx::query_as(&format!(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            picture = COALESCE($3, picture),
            preferences = COALESCE($4, preferences),
            ai_interests = COALESCE($5, ai_interests)
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&patch.name)
    .bind(&patch.picture)
    .bind(&patch.preferences)
    .bind(&patch.ai_interests)
    .fetch_optional(pool)
    .await
    .context("failed to update profile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
