//! # Volta Terminal Entry Point
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,volta=debug,sqlx=warn (override with RUST_LOG)      │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • path from argv[1], else the platform config dir                   │
//! │     • VOLTA_* environment overrides                                     │
//! │                                                                         │
//! │  3. Open the Shop ────────────────────────────────────────────────────► │
//! │     • memory or SQLite document store                                   │
//! │     • restore the saved session                                         │
//! │     • seed an empty catalog, start the live mirror                      │
//! │                                                                         │
//! │  4. Serve ────────────────────────────────────────────────────────────► │
//! │     • axum on the configured local address                              │
//! │     • Ctrl+C / SIGTERM stops the mirror and exits                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use volta_sync::{Shop, ShopConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting Volta terminal");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ShopConfig::load(config_path).context("loading configuration")?;
    let addr = config.bind_addr()?;
    if config.staff.is_empty() {
        warn!("No staff accounts configured; admin and POS routes are unreachable");
    }

    let shop = Arc::new(Shop::open(config).await.context("opening the shop")?);
    if let Err(err) = shop.start().await {
        // The routes still answer; catalog reads stay empty until restart.
        error!(%err, "Catalog sync failed to start");
    }

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Terminal listening");

    let app = volta_terminal::router(shop.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    shop.shutdown();
    info!("Terminal shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=volta=trace` - Show trace for volta crates only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,volta=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(%err, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
