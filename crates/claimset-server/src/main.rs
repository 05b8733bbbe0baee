//! claimset server
//!
//! - Read-only claims API: /v1/metrics/:id, /v1/content/:id, /v1/render
//! - Development auditor: periodic report + final report on shutdown

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use claimset_server::{app_state, config, report, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("CLAIMSET_CONFIG").unwrap_or_else(|_| "claimset.yaml".into());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            std::process::exit(2);
        }
    };
    let listen: SocketAddr = match cfg.server.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(listen = %cfg.server.listen, error = %e, "server.listen must be a valid SocketAddr");
            std::process::exit(2);
        }
    };

    let state = match app_state::AppState::new(cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "registry load failed");
            std::process::exit(2);
        }
    };

    let tracker = state.claims().tracker();
    let mut timer = report::spawn_periodic_report(tracker.clone(), state.cfg().audit.report_interval());
    let app = router::build_router(state);

    tracing::info!(%listen, audit = tracker.is_enabled(), "claimset-server starting");
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    timer.stop();
    report::log_final_report(&tracker);

    if let Err(e) = served {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl-C handler; graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
