use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Read-only portal pages plus the session helpers. Anything not listed in the route table
/// under `/admin`, `/profile` or `/auth` is public.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The three newest active contests and the three latest news.
        .route("/", get(handlers::home))
        // GET /contests?status=...&search=...
        .route("/contests", get(handlers::list_contests))
        // GET /contests/{id}
        // Contest details with approved works only.
        .route("/contests/{id}", get(handlers::get_contest))
        .route("/news", get(handlers::list_news))
        .route("/news/{id}", get(handlers::get_news))
        .route("/faq", get(handlers::list_faq))
        // GET /session
        // Presentation data for conditional UI (e.g. the admin link). Grants nothing.
        .route("/session", get(handlers::get_session))
        // POST /logout
        // Lives outside `/auth` so a signed-in user is not redirected away from it.
        .route("/logout", post(handlers::logout))
}
