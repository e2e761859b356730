use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Admin Router Module
///
/// Nested under `/admin`. The gate only lets callers whose account record has the `admin`
/// role through; each handler additionally takes the `AdminUser` extractor, which rejects
/// with 403 if the gate's context does not confirm the role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Dashboard counters (users, admins, contests, news, pending works).
        .route("/", get(handlers::get_dashboard))
        // --- Contests ---
        .route(
            "/contests",
            get(handlers::admin_list_contests).post(handlers::create_contest),
        )
        .route(
            "/contests/{id}",
            get(handlers::admin_get_contest)
                .put(handlers::update_contest)
                .delete(handlers::delete_contest),
        )
        // --- News ---
        .route(
            "/news",
            get(handlers::admin_list_news).post(handlers::create_news),
        )
        .route("/news/{id}", axum::routing::delete(handlers::delete_news))
        // --- FAQ ---
        .route(
            "/faq",
            get(handlers::admin_list_faq).post(handlers::create_faq),
        )
        // PUT /admin/faq/order
        // Full id list in the new order.
        .route("/faq/order", put(handlers::reorder_faq))
        .route(
            "/faq/{id}",
            put(handlers::update_faq).delete(handlers::delete_faq),
        )
        // --- Works ---
        // GET /admin/works?filter=all|approved|pending
        .route(
            "/works",
            get(handlers::list_works).post(handlers::create_work),
        )
        .route("/works/{id}", axum::routing::delete(handlers::delete_work))
        .route("/works/{id}/approval", patch(handlers::set_work_approval))
        // --- Uploads ---
        // POST /admin/uploads/presigned
        // Presigned image upload (10 minutes, image/* only, 5 MiB max).
        .route("/uploads/presigned", post(handlers::create_upload_url))
}
