//! Serve command - run the HTTP service

use std::net::SocketAddr;
use template_pr::config::AppConfig;
use template_pr::error::{Error, Result};
use template_pr::server::{AppState, router};
use tracing::{info, warn};

/// Bind and serve until SIGINT/SIGTERM
pub async fn run_serve(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::Config(format!("invalid bind address: {e}")))?;

    if config.github.token.is_none() {
        warn!("no GitHub token configured; PR creation will fail per record");
    }
    if !config.script.exists() {
        warn!(script = %config.script.display(), "automation script not found");
    }
    std::fs::create_dir_all(&config.scratch_dir)?;

    let app = router(AppState::from_config(config)?)?;

    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
