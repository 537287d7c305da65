//! Login, logout, and the session extractors.
//!
//! Sessions ride an HttpOnly cookie with a bearer-token fallback in the
//! `Authorization` header. First login auto-provisions the account when the
//! email sits under the allowed student domain.

use axum::extract::{FromRequestParts, State};
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, request::Parts};
use axum::response::{IntoResponse, Json, Response};
use cookie::{Cookie, SameSite};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use ts_rs::TS;

use crate::data::{sessions, users};
use crate::data::users::UserResponse;
use crate::state::AppState;
use crate::web::error::{ApiError, db_error};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_token";

/// Pull the session token from the cookie or a bearer Authorization header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(raw) = headers.get(COOKIE)
        && let Ok(raw) = raw.to_str()
    {
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == SESSION_COOKIE {
                return Some(cookie.value().to_string());
            }
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

/// The authenticated user, resolved from the session cache with a database
/// fallback.
pub struct CurrentUser(pub users::User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("not authenticated"))?;

        if let Some(user) = state.session_cache.get(&token) {
            return Ok(CurrentUser(user));
        }

        let (user, expires_at) = sessions::lookup_user(&state.db_pool, &token)
            .await
            .map_err(|e| db_error("Session lookup", e))?
            .ok_or_else(|| ApiError::unauthorized("invalid or expired session"))?;

        state.session_cache.insert(&token, user.clone(), expires_at);
        Ok(CurrentUser(user))
    }
}

/// An authenticated admin; rejects everyone else with a 403.
pub struct AdminUser(pub users::User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::forbidden("admin access required"));
        }
        Ok(AdminUser(user))
    }
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn session_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::seconds(max_age_secs))
        .build()
}

/// `POST /api/auth/login`
///
/// Unknown emails under the allowed domain are provisioned on the spot; the
/// admin flag derives from the configured admin email.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("email and password required"));
    }

    let domain_suffix = format!("@{}", state.auth.allowed_email_domain);
    if !email.ends_with(&domain_suffix) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let user = match users::get_by_email(&state.db_pool, &email)
        .await
        .map_err(|e| db_error("User lookup", e))?
    {
        Some(user) => {
            if !users::verify_password(&body.password, &user.password_hash) {
                return Err(ApiError::unauthorized("invalid credentials"));
            }
            user
        }
        None => {
            let hash = users::hash_password(&body.password)
                .map_err(|e| db_error("Password hashing", e))?;
            let is_admin = email == state.auth.admin_email;
            let user = users::create_user(&state.db_pool, &email, &hash, is_admin)
                .await
                .map_err(|e| db_error("User creation", e))?;
            info!(user_id = user.id, is_admin, "Provisioned new account");
            user
        }
    };

    let (token, expires_at) =
        sessions::create_session(&state.db_pool, user.id, state.auth.session_ttl)
            .await
            .map_err(|e| db_error("Session creation", e))?;
    state.session_cache.insert(&token, user.clone(), expires_at);

    let cookie = session_cookie(&token, state.auth.session_ttl.num_seconds());
    let mut response = Json(UserResponse::from(&user)).into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| db_error("Cookie encoding", e.into()))?,
    );
    Ok(response)
}

/// `GET /api/auth/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// `POST /api/auth/logout`
///
/// Deleting an unknown token still succeeds; the cookie is cleared either
/// way.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = extract_token(&headers) {
        sessions::delete_session(&state.db_pool, &token)
            .await
            .map_err(|e| db_error("Session deletion", e))?;
        state.session_cache.invalidate(&token);
    }

    let expired = session_cookie("", 0);
    let mut response = Json(json!({"message": "logged out"})).into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_str(&expired.to_string())
            .map_err(|e| db_error("Cookie encoding", e.into()))?,
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session_token=sess_abc; other=1"),
        );
        assert_eq!(extract_token(&headers), Some("sess_abc".to_string()));
    }

    #[test]
    fn token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer sess_xyz"));
        assert_eq!(extract_token(&headers), Some("sess_xyz".to_string()));
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session_token=from_cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from_bearer"));
        assert_eq!(extract_token(&headers), Some("from_cookie".to_string()));
    }

    #[test]
    fn missing_token_is_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let c = session_cookie("sess_abc", 3600);
        assert!(c.http_only().unwrap_or(false));
        assert_eq!(c.same_site(), Some(SameSite::Lax));
        assert_eq!(c.path(), Some("/"));
    }
}
