//! Web API router construction.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use crate::web::{admin, auth, chats, comments, faculty, rankings, ratings, recommendations, status, users};

/// Creates the web server router
pub fn create_router(app_state: AppState, cors_origins: &[String]) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/users/me", patch(users::update_me))
        .route("/faculty", get(faculty::list_faculty).post(faculty::create_faculty))
        .route(
            "/faculty/{id}",
            get(faculty::get_faculty)
                .patch(faculty::update_faculty)
                .delete(faculty::delete_faculty),
        )
        .route(
            "/faculty/{id}/ratings",
            post(ratings::submit_rating),
        )
        .route("/faculty/{id}/ratings/me", get(ratings::my_rating))
        .route(
            "/faculty/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/{id}", delete(comments::delete_comment))
        .route("/chats", get(chats::list_chats))
        .route("/chats/messages", post(chats::send_message))
        .route("/recommendations", get(recommendations::recommendations))
        .route("/rankings", get(rankings::rankings))
        .route("/admin/faculty/import", post(admin::import_faculty))
        .route("/admin/scholar-sync", post(admin::run_scholar_sync))
        .with_state(app_state);

    Router::new().nest("/api", api_router).layer((
        TraceLayer::new_for_http(),
        cors_layer(cors_origins),
        TimeoutLayer::new(Duration::from_secs(60)),
    ))
}

/// Credentialed CORS for the configured frontend origins. Wildcards are not
/// allowed with credentials, so unparseable origins are dropped with a
/// warning instead of widening the policy.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
