// src/main.rs

use chrono::Utc;
use color_eyre::eyre::Result;
use cyberguardx::api;
use cyberguardx::config::ServerConfig;
use cyberguardx::core::breach::BreachChecker;
use cyberguardx::core::classifier::PhishingModel;
use cyberguardx::core::history::InMemoryHistory;
use cyberguardx::core::progress::ProgressTracker;
use cyberguardx::logging;
use cyberguardx::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{Duration, interval};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let config = ServerConfig::from_env();

    // The classifier is mandatory: refuse to start without a valid model
    // artifact rather than answer URL checks inconsistently later.
    let model = Arc::new(PhishingModel::load(&config.model_path)?);

    // The breach dataset is optional; a missing file degrades to an empty
    // dataset with a logged warning.
    let breach_checker = Arc::new(BreachChecker::load(&config.breach_data_path));

    let tracker = Arc::new(ProgressTracker::new());
    let state = AppState {
        model,
        breach_checker,
        tracker: tracker.clone(),
        history: Arc::new(InMemoryHistory::new()),
        config: Arc::new(config.clone()),
        start_time: Utc::now(),
    };

    // Periodic sweep of terminal progress entries past their retention.
    let retention = config.progress_retention();
    let cleanup_handle = tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(300));
        loop {
            tick.tick().await;
            let removed = tracker.prune_terminal(retention);
            if removed > 0 {
                info!(removed, "Pruned expired scan progress entries");
            }
        }
    });

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = api::build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(http = %addr, "CyberGuardX server started");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async { signal::ctrl_c().await.ok(); });
    if let Err(e) = server.await {
        error!(error = %e, "HTTP server error");
    }

    cleanup_handle.abort();
    info!("Server stopped");

    Ok(())
}
