// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::SocketAddr;

use novamart_core::ServiceName;

/// Inventory service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Version tag reported by the health endpoint.
    pub service_version: String,
    /// Deployment environment label.
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("INVENTORY_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => ServiceName::Inventory.default_port(),
        };

        let service_version =
            std::env::var("SERVICE_VERSION").unwrap_or_else(|_| "v1.0".to_string());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        Ok(Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            service_version,
            environment,
        })
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `INVENTORY_PORT` is not a valid TCP port.
    #[error("invalid INVENTORY_PORT: {0}")]
    InvalidPort(String),
}
