use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod analysis;
mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::{
    chat::ChatService,
    diary::DiaryService,
    documents::DocumentService,
    llm::Generators,
    medicines::FallbackMedicineFinder,
    text_extract::OcrTextExtractor,
};
use store::{ConditionStore, PgStore};

// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    pub conditions: Arc<dyn ConditionStore>,
    pub chat: ChatService,
    pub diary: DiaryService,
    pub documents: DocumentService,
}

impl AppState {
    /// Wire every service against Postgres and the configured generators.
    pub fn new(db: PgPool, config: Arc<Config>) -> anyhow::Result<Self> {
        let store = Arc::new(PgStore::new(db.clone()));
        let generators = Generators::from_config(&config)?;
        let extractor = Arc::new(OcrTextExtractor::new(
            config.ocr_service_url.clone(),
            config.llm_timeout_secs,
        )?);
        let medicine_finder = Arc::new(FallbackMedicineFinder::llm_then_regex(
            generators.documents.clone(),
        ));

        Ok(Self {
            db,
            config,
            rate_limiter: RateLimitState::new(),
            conditions: store.clone(),
            chat: ChatService::new(store.clone(), store.clone(), generators.chat),
            diary: DiaryService::new(store.clone(), generators.diary),
            documents: DocumentService::new(
                store,
                extractor,
                medicine_finder,
                generators.documents,
            ),
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    // Credential endpoints are rate limited per IP and path
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Profile
        .route(
            "/api/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route(
            "/api/profile/conditions",
            put(handlers::profile::update_conditions),
        )
        // Chatbot
        .route("/api/chat", post(handlers::chat::ask))
        .route("/api/chat/history", get(handlers::chat::history))
        // Diary
        .route(
            "/api/diary",
            get(handlers::diary::list_entries).post(handlers::diary::create_entry),
        )
        .route("/api/diary/by-date", get(handlers::diary::entries_by_date))
        // Mood analytics
        .route("/api/mood/analytics", get(handlers::mood::analytics))
        .route("/api/mood/trend", get(handlers::mood::trend))
        .route("/api/mood/summary", get(handlers::mood::summary))
        // Documents
        .route(
            "/api/documents",
            get(handlers::documents::list_documents)
                .post(handlers::documents::upload_document)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/documents/:id",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn spawn_rate_limit_sweeper(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "healthmate_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let db = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations applied");

    let state = AppState::new(db, config.clone())?;
    tracing::info!(
        provider = ?config.llm_provider,
        ocr = config.ocr_service_url.is_some(),
        "Services initialised"
    );

    spawn_rate_limit_sweeper(state.rate_limiter.clone());

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Client IP is needed by the auth rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
