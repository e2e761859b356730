use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod repository;
pub mod storage;

// The session-gating policy (classifier, resolvers, decision engine, gate).
pub mod access;

// Module for routing segregation (Public, Guest, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, guest, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use access::{AccessEngine, AccessState, RoleResolver, RouteTable, SessionResolver};
pub use auth::{AuthState, JwtVerifier, SupabaseAuthClient};
pub use config::AppConfig;
pub use error::{AppError, BackendError};
pub use repository::{AccountStoreState, ContentState, PostgresRepository};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas decorated with `#[utoipa::path]`
/// and `#[derive(utoipa::ToSchema)]`. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home, handlers::list_contests, handlers::get_contest, handlers::list_news,
        handlers::get_news, handlers::list_faq, handlers::get_session, handlers::logout,
        handlers::login_form, handlers::register_form, handlers::login, handlers::register,
        handlers::reset_password, handlers::get_profile, handlers::update_profile,
        handlers::get_dashboard, handlers::admin_list_contests, handlers::admin_get_contest,
        handlers::create_contest, handlers::update_contest, handlers::delete_contest,
        handlers::admin_list_news, handlers::create_news, handlers::delete_news,
        handlers::admin_list_faq, handlers::create_faq, handlers::update_faq,
        handlers::delete_faq, handlers::reorder_faq, handlers::list_works,
        handlers::create_work, handlers::set_work_approval, handlers::delete_work,
        handlers::create_upload_url
    ),
    components(
        schemas(
            models::Identity, models::Role, models::AccountRecord, models::ProfileUpdate,
            models::RegisterRequest, models::LoginRequest, models::PasswordResetRequest,
            models::AuthResponse, models::FormDescriptor, models::SessionView,
            models::ProfilePage, models::ContestStatus, models::Contest,
            models::CreateContestRequest, models::UpdateContestRequest, models::PhotoCategory,
            models::ContestPhoto, models::ContestDetail, models::WorkFilter,
            models::CreateWorkRequest, models::SetApprovalRequest, models::News,
            models::CreateNewsRequest, models::FaqItem, models::CreateFaqRequest,
            models::UpdateFaqRequest, models::ReorderFaqRequest, models::HomePage,
            models::DashboardStats, models::UploadKind, models::PresignedUrlRequest,
            models::PresignedUrlResponse,
        )
    ),
    tags(
        (name = "vektor-portal", description = "Vektor contest & news portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. The single, thread-safe and immutable container
/// holding all application services and configuration, shared across all requests.
#[derive(Clone)]
pub struct AppState {
    /// Account records (`profiles`): the role source for the access policy.
    pub accounts: AccountStoreState,
    /// Contests, works, news and FAQ.
    pub content: ContentState,
    /// Supabase Auth: session checks, sign-in, sign-up, password reset.
    pub auth: AuthState,
    /// Storage Layer: S3/MinIO presigned upload URLs.
    pub storage: StorageState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// The access decision engine used by the gate.
    pub access: AccessState,
}

impl AppState {
    /// new
    ///
    /// Assembles the state and builds the access engine over the same account store and
    /// auth provider the handlers use.
    pub fn new(
        accounts: AccountStoreState,
        content: ContentState,
        auth: AuthState,
        storage: StorageState,
        config: AppConfig,
    ) -> Self {
        let access = Arc::new(AccessEngine::new(
            RouteTable::default(),
            SessionResolver::new(auth.clone(), accounts.clone(), &config),
            RoleResolver::new(accounts.clone(), config.backend_timeout),
        ));

        Self {
            accounts,
            content,
            auth,
            storage,
            config,
            access,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers and middleware to pull single components from AppState.

impl FromRef<AppState> for AccountStoreState {
    fn from_ref(app_state: &AppState) -> AccountStoreState {
        app_state.accounts.clone()
    }
}

impl FromRef<AppState> for ContentState {
    fn from_ref(app_state: &AppState) -> ContentState {
        app_state.content.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for AccessState {
    fn from_ref(app_state: &AppState) -> AccessState {
        app_state.access.clone()
    }
}

/// create_router
///
/// Assembles the application's routing structure, applies the access gate and the
/// observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/auth", guest::guest_routes())
        .merge(authenticated::authenticated_routes())
        .nest("/admin", admin::admin_routes())
        // Unknown paths still pass the gate, so `/admin/<anything>` redirects before a 404.
        .fallback(handlers::not_found)
        // 3. Access Gate: the single enforcement point for every route above.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access::access_gate,
        ))
        // Apply the Unified State to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (Applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: wraps the request/response lifecycle in a span
                // carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: echoes x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Used by `TraceLayer` to build the request span. Includes the `x-request-id` header
/// (if present) alongside the HTTP method and URI, so every log line of one request
/// is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
