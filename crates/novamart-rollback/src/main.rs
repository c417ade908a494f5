// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rollback webhook entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use novamart_core::version_store::EnvFileStore;
use novamart_rollback::http::{router, AppState};
use novamart_rollback::monitor::LatencyMonitor;
use novamart_rollback::probe::HttpHealthProbe;
use novamart_rollback::restart::{ComposeRestarter, ServiceRestarter};
use novamart_rollback::{Config, RollbackExecutor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("novamart_rollback=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    info!(
        version = %config.service_version,
        environment = %config.environment,
        env_file = %config.env_file.display(),
        compose_file = %config.compose_file.display(),
        known_versions = ?config.executor.known_versions,
        "Starting rollback webhook"
    );

    let restarter: Arc<dyn ServiceRestarter> = Arc::new(ComposeRestarter::new(
        config.compose_file.clone(),
        config.env_file.clone(),
    ));
    if !restarter.is_available().await {
        warn!("No docker compose binary found, rollbacks will fail at the restart stage");
    }

    let executor = Arc::new(RollbackExecutor::new(
        EnvFileStore::new(config.env_file.clone()),
        restarter.clone(),
        Arc::new(HttpHealthProbe::new(config.service_urls.clone())),
        config.executor.clone(),
    ));

    let mut monitor_task = None;
    let mut monitor_shutdown = None;
    if config.monitor_enabled {
        let sampler = config
            .monitor_sampler()
            .context("failed to build latency sampler")?;
        let monitor = LatencyMonitor::new(
            Arc::new(sampler),
            executor.clone(),
            config.monitor.clone(),
        );
        monitor_shutdown = Some(monitor.shutdown_handle());
        monitor_task = Some(tokio::spawn(async move { monitor.run().await }));
    } else {
        info!("Latency monitor disabled");
    }

    let state = Arc::new(AppState {
        executor,
        restarter,
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Rollback webhook listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(shutdown) = monitor_shutdown {
        shutdown.notify_one();
    }
    if let Some(task) = monitor_task {
        let _ = task.await;
    }

    info!("Rollback webhook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install shutdown signal handler");
        return;
    }
    info!("Shutdown signal received");
}
