// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::SocketAddr;

use novamart_core::ServiceName;

/// Version tag whose deployment carries the slow trace logging path.
pub const BUGGED_VERSION: &str = "v1.1-bad";

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Version tag reported by the health endpoint.
    pub service_version: String,
    /// Deployment environment label.
    pub environment: String,
    /// Base URL of the inventory service.
    pub inventory_url: String,
    /// Base URL of the payment service.
    pub payment_url: String,
    /// Force-enable the slow trace logging path regardless of version.
    pub enable_bug: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("ORDER_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => ServiceName::Order.default_port(),
        };

        let service_version =
            std::env::var("SERVICE_VERSION").unwrap_or_else(|_| "v1.0".to_string());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        let inventory_url = std::env::var("INVENTORY_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string());
        let payment_url = std::env::var("PAYMENT_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8082".to_string());
        let enable_bug = match std::env::var("ORDER_SERVICE_ENABLE_BUG") {
            Ok(raw) => raw
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidFlag(raw))?,
            Err(_) => false,
        };

        Ok(Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            service_version,
            environment,
            inventory_url,
            payment_url,
            enable_bug,
        })
    }

    /// Whether the slow trace logging path is active for this process.
    pub fn bug_active(&self) -> bool {
        self.enable_bug || self.service_version == BUGGED_VERSION
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `ORDER_PORT` is not a valid TCP port.
    #[error("invalid ORDER_PORT: {0}")]
    InvalidPort(String),

    /// `ORDER_SERVICE_ENABLE_BUG` is not `true` or `false`.
    #[error("invalid ORDER_SERVICE_ENABLE_BUG: {0}")]
    InvalidFlag(String),
}
