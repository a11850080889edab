use anyhow::{Context, Result};
use farmtech_waitlist::{router, AppState, SqliteWaitlistStore, WaitlistConfig, WaitlistStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Check if we should enable tokio-console
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        console_subscriber::init();
        info!("tokio-console enabled on port 6669");
    } else {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,farmtech_waitlist=debug,tower_http=info")
        });
        fmt().with_env_filter(env_filter).with_target(true).init();
    }

    let config = WaitlistConfig::from_env().context("Failed to load configuration")?;

    let store = SqliteWaitlistStore::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open waitlist database at {}",
            config.database_path.display()
        )
    })?;
    let store: Arc<dyn WaitlistStore> = Arc::new(store);

    let state = AppState::new(store, &config);

    // Create task tracker and cancellation token for coordinated shutdown
    let cancellation_token = CancellationToken::new();
    let task_tracker = TaskTracker::new();

    // Periodically drop expired rate limit windows
    let rate_limiter = state.signup_rate_limiter.clone();
    let prune_token = cancellation_token.clone();
    task_tracker.spawn(async move {
        let mut interval = tokio::time::interval(rate_limiter.window());
        loop {
            tokio::select! {
                _ = prune_token.cancelled() => {
                    info!("Rate limit pruner cancelled, exiting");
                    break;
                }
                _ = interval.tick() => {
                    rate_limiter.prune_expired();
                }
            }
        }
    });

    let app = router(state, &config.static_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌱 FarmTech Waitlist Server running on {}", addr);
    info!("Database: {}", config.database_path.display());
    info!("Static content: {}", config.static_dir.display());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancellation_token.clone()))
    .await?;

    info!("Server stopped, shutting down background tasks...");
    cancellation_token.cancel();
    task_tracker.close();

    match tokio::time::timeout(Duration::from_secs(10), task_tracker.wait()).await {
        Ok(()) => info!("Clean shutdown complete"),
        Err(_) => {
            error!("Timeout waiting for background tasks to complete");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    token.cancel();
}
