//! WebLoom API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication (signup/login, bearer token verification)
//! - Scrape ingestion and listing
//! - Question answering
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use webloom_answer::{GeminiClient, QuestionPipeline, RemoteModel};
use webloom_common::{
    auth::JwtManager,
    config::AppConfig,
    db::DbPool,
    metrics,
    Repository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub jwt: Arc<JwtManager>,
    pub pipeline: Arc<QuestionPipeline>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    // Initialize tracing
    init_tracing(&config);

    info!("Starting WebLoom API Gateway v{}", webloom_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();

    // Initialize database connection and schema
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db);

    // Token manager
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_secs,
    ));

    // Remote model capability; None keeps the pipeline on the fallback path
    let model: Option<Arc<dyn RemoteModel>> = GeminiClient::from_config(&config.ai)
        .map(|client| Arc::new(client) as Arc<dyn RemoteModel>);
    let pipeline = Arc::new(QuestionPipeline::new(Arc::new(repo.clone()), model));

    // Create app state
    let config = Arc::new(config);
    let state = AppState {
        config: config.clone(),
        repo,
        jwt,
        pipeline,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server.host {:?}: {e}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber from configuration; RUST_LOG wins
/// when set
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Account endpoints (no auth)
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))

        // Scrape endpoints (auth required, enforced by the AuthUser extractor)
        .route("/scrape", post(handlers::scrape::save_content).get(handlers::scrape::list_content))
        .route("/scrape/{id}", delete(handlers::scrape::delete_content))

        // Question endpoint (optional auth)
        .route("/question", post(handlers::question::ask_question));

    // Compose the app
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
