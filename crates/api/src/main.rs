use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vortex_api::cache::RedisCache;
use vortex_api::config::ServerConfig;
use vortex_api::router::build_app_router;
use vortex_api::state::AppState;
use vortex_core::cache::{KeyValueCache, MemoryCache};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vortex_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, debug = config.debug, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = vortex_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    vortex_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    vortex_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Cache ---
    let redis = config.cache.redis_url.as_deref().map(|url| {
        Arc::new(
            RedisCache::new(url, config.cache.key_prefix.clone()).expect("Invalid REDIS_URL"),
        )
    });
    let cache: Arc<dyn KeyValueCache> = match &redis {
        Some(redis) => {
            match redis.connect().await {
                Ok(()) => tracing::info!("Redis cache connected"),
                // Fail open: the server runs without deduplication until
                // Redis comes back.
                Err(err) => tracing::warn!("Redis cache unavailable at startup: {err}"),
            }
            Arc::clone(redis) as Arc<dyn KeyValueCache>
        }
        None => {
            tracing::warn!("REDIS_URL not set, using process-local cache");
            Arc::new(MemoryCache::new())
        }
    };

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        cache,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // The drain timer starts when the signal arrives, not at startup.
    let shutdown = Arc::new(Notify::new());
    let trigger = Arc::clone(&shutdown);
    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        trigger.notify_one();
    });
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        result = &mut server => {
            result.expect("Server task panicked").expect("Server error");
        }
        () = shutdown.notified() => {
            let drain = Duration::from_secs(config.shutdown_timeout_secs);
            match tokio::time::timeout(drain, &mut server).await {
                Ok(result) => result.expect("Server task panicked").expect("Server error"),
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = config.shutdown_timeout_secs,
                        "Connections still open after drain timeout, forcing shutdown"
                    );
                    server.abort();
                }
            }
        }
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(redis) = redis {
        redis.disconnect().await;
        tracing::info!("Redis cache disconnected");
    }

    pool.close().await;
    tracing::info!("Database pool closed");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
