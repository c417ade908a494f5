// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the payment service.

use std::net::SocketAddr;

/// Payment service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address.
    pub listen_addr: SocketAddr,
    /// Version tag this process reports (read once at boot).
    pub service_version: String,
    /// Deployment environment label.
    pub environment: String,
    /// Target decline rate for the outcome simulator.
    pub failure_rate: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("PAYMENT_PORT")
            .unwrap_or_else(|_| "8082".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let listen_addr = SocketAddr::from(([0, 0, 0, 0], port));

        let service_version =
            std::env::var("SERVICE_VERSION").unwrap_or_else(|_| "v1.0".to_string());

        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        let failure_rate: f64 = std::env::var("PAYMENT_FAILURE_RATE")
            .unwrap_or_else(|_| "0.01".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidFailureRate)?;
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(ConfigError::InvalidFailureRate);
        }

        Ok(Self {
            listen_addr,
            service_version,
            environment,
            failure_rate,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The port number is invalid.
    #[error("Invalid port number")]
    InvalidPort,
    /// The failure rate is not a number in [0, 1].
    #[error("PAYMENT_FAILURE_RATE must be a number in [0, 1]")]
    InvalidFailureRate,
}
