mod bootstrap;
mod health;
mod orders;

use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use reorder_core::config::{AppConfig, LoadOptions};

use crate::orders::OrdersState;

fn init_logging(config: &AppConfig) {
    use reorder_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let server = &app.config.server;
    let address = format!("{}:{}", server.bind_address, server.port);
    let grace = Duration::from_secs(server.graceful_shutdown_secs);

    let routes = Router::new().merge(health::router(app.service.clone())).merge(orders::router(
        OrdersState::new(app.service.clone(), app.config.data.clone(), app.config.policy),
    ));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        cache_enabled = app.service.cache_enabled(),
        "reorder-server listening"
    );

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown = async move {
        if let Err(error) = wait_for_shutdown().await {
            tracing::error!(
                event_name = "system.server.signal_error",
                correlation_id = "shutdown",
                error = %error,
                "could not listen for ctrl-c"
            );
        }
        tracing::info!(
            event_name = "system.server.stopping",
            correlation_id = "shutdown",
            grace_secs = grace.as_secs(),
            "reorder-server stopping"
        );
        let _ = signalled_tx.send(());
    };
    let server_task = tokio::spawn(async move {
        axum::serve(listener, routes).with_graceful_shutdown(shutdown).await
    });

    // in-flight requests get `grace` to drain once the signal fires
    let _ = signalled_rx.await;
    match tokio::time::timeout(grace, server_task).await {
        Ok(joined) => joined.context("server task failed")??,
        Err(_) => tracing::warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            grace_secs = grace.as_secs(),
            "graceful shutdown window elapsed"
        ),
    }

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "reorder-server stopped"
    );
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
