use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

mod auth;
mod config;
mod database;
mod handlers;
mod services;
mod utils;

use auth::JwtManager;
use config::Settings;
use database::{DbPool, Repository};
use services::{AssistantService, ChunkingService, DocumentService, OpenAiService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,hr_assistant_api=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("🚀 Starting HR Assistant API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    // Initialize database pool and schema
    let db_pool = DbPool::new(&settings.database).await?;
    db_pool.migrate().await?;
    info!("✅ Database connection established");

    let repository = Arc::new(Repository::new(db_pool.clone()));

    // Initialize services
    let openai_service = Arc::new(OpenAiService::new(settings.openai.clone()));

    let assistant_service = Arc::new(AssistantService::new(
        openai_service.clone(),
        settings.openai.answer_max_tokens,
        settings.documents.max_context_chars,
    ));

    let chunking_service = Arc::new(ChunkingService::new(
        openai_service.clone(),
        settings.openai.chunking_max_tokens,
    ));

    let document_service = Arc::new(DocumentService::new(
        repository.clone(),
        chunking_service,
        settings.documents.storage_path.clone(),
    ));

    let jwt_manager = Arc::new(JwtManager::new(&settings.auth.jwt_secret));

    // Build router
    let app = build_router(
        db_pool.clone(),
        repository,
        assistant_service,
        document_service,
        jwt_manager,
    );

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

fn build_router(
    db_pool: DbPool,
    repository: Arc<Repository>,
    assistant_service: Arc<AssistantService>,
    document_service: Arc<DocumentService>,
    jwt_manager: Arc<JwtManager>,
) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    // Authenticated routes (AuthUser extractor validates the bearer token)
    let api_routes = Router::new()
        .route("/api/ai/ask", post(handlers::ai::ask_handler))
        .route("/api/ai/conversations", get(handlers::ai::conversations_handler))
        .route(
            "/api/hr-documents",
            get(handlers::documents::list_documents_handler),
        )
        .route(
            "/api/hr-documents/upload",
            post(handlers::documents::upload_document_handler),
        )
        .route(
            "/api/hr-documents/{id}",
            delete(handlers::documents::delete_document_handler),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Shared state
        .layer(Extension(db_pool))
        .layer(Extension(repository))
        .layer(Extension(assistant_service))
        .layer(Extension(document_service))
        .layer(Extension(jwt_manager))
        // CORS
        .layer(
            CorsLayer::permissive()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        // Turn handler panics into 500s instead of dropping the connection
        .layer(CatchPanicLayer::new())
        // Body limit (document uploads - max 20MB)
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}
