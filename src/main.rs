use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, Request};
use axum::response::Response;
use chrono::Utc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use dungeon_server::config::{Config, Environment};
use dungeon_server::game::{GameHub, SessionController};
use dungeon_server::gateway::BroadcastGateway;
use dungeon_server::maze::RoomsAndCorridors;
use dungeon_server::state::AppState;
use dungeon_server::stats::{DatabaseSink, LogSink, StatsQueue, StatsSink, spawn_recorder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize structured logging
    init_tracing(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting dungeon server"
    );

    // Connect to the stats database, if any
    let db = if let Some(url) = &config.database_url {
        tracing::info!("Connecting to database...");
        let db = dungeon_server::db::connect(url).await?;
        tracing::info!("Database connected and migrated");
        Some(db)
    } else {
        tracing::warn!("DATABASE_URL not set, round summaries will only be logged");
        None
    };

    // Start the stats recorder
    let sink: Arc<dyn StatsSink> = match &db {
        Some(db) => Arc::new(DatabaseSink::new(db.clone())),
        None => Arc::new(LogSink),
    };
    let (stats, stats_rx) = StatsQueue::new();
    let recorder = spawn_recorder(sink, stats_rx);

    // Generate the first dungeon
    let controller = SessionController::new(
        Box::new(RoomsAndCorridors::new()),
        config.dungeon.clone(),
        stats,
        Utc::now(),
    )?;
    tracing::info!("Initial dungeon generated");

    // Build application state
    let state = AppState {
        db,
        config: config.clone(),
        hub: GameHub::new(controller, BroadcastGateway::new()),
    };

    let app = build_app(state, &config);

    // Start the server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Dungeon server listening - connect to http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    recorder.abort();
    Ok(())
}

/// Build the full application router with all middleware layers.
fn build_app(state: AppState, config: &Config) -> Router {
    let cors = if config.environment == Environment::Development {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_methods([Method::GET])
            .max_age(Duration::from_secs(3600))
    };

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                status_code = tracing::field::Empty,
            )
        })
        .on_response(|response: &Response, latency: Duration, span: &Span| {
            span.record("status_code", response.status().as_u16());
            tracing::debug!(latency_ms = latency.as_millis(), "response");
        });

    dungeon_server::routes::router()
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
}

/// Initialize the `tracing` subscriber with an environment-based filter.
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("dungeon_server={log_level},tower_http=info,sea_orm=warn").into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, shutting down gracefully...");
        },
    }
}
