use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in user. Handlers take the `CurrentUser` extractor, which reads the
/// identity stored by the gate and rejects with 401 if it is missing.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/PUT /profile
        // The caller's own account record. Role and consents are read-only.
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
}
