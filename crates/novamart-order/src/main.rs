// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Order service entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use novamart_order::http::{router, AppState};
use novamart_order::{Config, OrderService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("novamart_order=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    info!(
        version = %config.service_version,
        environment = %config.environment,
        inventory_url = %config.inventory_url,
        payment_url = %config.payment_url,
        "Starting order service"
    );
    if config.bug_active() {
        warn!("Extended order trace logging is active, expect slow orders");
    }

    let state = Arc::new(AppState {
        service: OrderService::new(config.clone()),
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Order service listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Order service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install shutdown signal handler");
        return;
    }
    info!("Shutdown signal received");
}
