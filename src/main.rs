use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vektor_portal::{
    AppState,
    auth::{AuthState, JwtVerifier, SupabaseAuthClient},
    config::{AppConfig, Env, SessionVerification},
    create_router,
    repository::{AccountStoreState, ContentState, PostgresRepository},
    storage::{S3StorageClient, StorageService, StorageState},
};

/// main
///
/// The asynchronous entry point for the application, responsible for initializing
/// all core components: Configuration, Logging, Database, Auth, Storage, and the HTTP Server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG takes priority, with defaults suited to local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vektor_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.dev_auth_bypass {
        tracing::warn!("DEV_AUTH_BYPASS is on: x-user-id headers are trusted without a session");
    }

    // 4. Database Initialization (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    // LOCAL-ONLY: the hosted Supabase schema is managed from the Supabase dashboard.
    if config.env == Env::Local {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("FATAL: Failed to run database migrations.");
    }

    // One repository serves both stores.
    let repo = Arc::new(PostgresRepository::new(pool));
    let accounts = repo.clone() as AccountStoreState;
    let content = repo as ContentState;

    // 5. Auth Initialization (Supabase Auth)
    let mut auth_client = SupabaseAuthClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        config.backend_timeout,
    );
    if config.session_verification == SessionVerification::Local {
        auth_client = auth_client.with_local_verification(JwtVerifier::new(
            &config.jwt_secret,
            &config.jwt_audience,
        ));
    }
    tracing::info!(
        "Session verification: {:?}",
        config.session_verification
    );
    let auth = Arc::new(auth_client) as AuthState;

    // 6. Storage Initialization (S3/MinIO)
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
        &config.storage_public_url,
    )
    .await;

    // LOCAL-ONLY: Ensure the MinIO bucket exists.
    if config.env == Env::Local {
        s3_client.ensure_bucket_exists().await;
    }

    let storage = Arc::new(s3_client) as StorageState;

    // 7. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(accounts, content, auth, storage, config);

    // 8. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
