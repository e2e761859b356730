use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Guest Router Module
///
/// Nested under `/auth`. A caller with a valid session is redirected to `/profile` by the
/// gate before reaching any of these handlers.
pub fn guest_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /auth/login
        // Password sign-in. Sets the session cookie and creates a missing account record.
        .route("/login", get(handlers::login_form).post(handlers::login))
        // GET/POST /auth/register
        // Sign-up with the three mandatory consents. The first account becomes admin.
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        // POST /auth/reset-password
        .route("/reset-password", post(handlers::reset_password))
}
