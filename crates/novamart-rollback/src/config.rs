// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use novamart_core::ServiceName;

use crate::executor::ExecutorSettings;
use crate::history::RollbackHistory;
use crate::monitor::{HttpLatencySampler, MonitorSettings};

/// Rollback webhook configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Version tag reported by the health endpoint.
    pub service_version: String,
    /// Deployment environment label.
    pub environment: String,
    /// Shared env file holding per-service version keys.
    pub env_file: PathBuf,
    /// Compose file used by the restart backend.
    pub compose_file: PathBuf,
    /// Base URLs for health verification, keyed by service.
    pub service_urls: HashMap<ServiceName, String>,
    /// Executor timeouts and limits.
    pub executor: ExecutorSettings,
    /// Whether the latency monitor runs.
    pub monitor_enabled: bool,
    /// Latency monitor settings.
    pub monitor: MonitorSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("WEBHOOK_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 9000,
        };

        let service_version =
            std::env::var("SERVICE_VERSION").unwrap_or_else(|_| "v1.0".to_string());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        let env_file = PathBuf::from(
            std::env::var("ENV_FILE").unwrap_or_else(|_| "/app/infra/.env".to_string()),
        );
        let compose_file = PathBuf::from(
            std::env::var("COMPOSE_FILE")
                .unwrap_or_else(|_| "/app/infra/docker-compose.yml".to_string()),
        );

        let known_versions: Vec<String> = std::env::var("ROLLBACK_KNOWN_VERSIONS")
            .unwrap_or_else(|_| "v1.0,v1.1-bad".to_string())
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if known_versions.is_empty() {
            return Err(ConfigError::NoKnownVersions);
        }

        let mut service_urls = HashMap::new();
        for service in ServiceName::ALL {
            let var = match service {
                ServiceName::Order => "ORDER_SERVICE_URL",
                ServiceName::Inventory => "INVENTORY_SERVICE_URL",
                ServiceName::Payment => "PAYMENT_SERVICE_URL",
            };
            let url = std::env::var(var)
                .unwrap_or_else(|_| format!("http://localhost:{}", service.default_port()));
            service_urls.insert(service, url);
        }

        let executor = ExecutorSettings {
            known_versions,
            restart_timeout: duration_secs("RESTART_TIMEOUT_SECS", 60)?,
            verify_timeout: duration_secs("VERIFY_TIMEOUT_SECS", 60)?,
            verify_interval: duration_secs("VERIFY_INTERVAL_SECS", 2)?,
            history_capacity: parse_or("ROLLBACK_HISTORY_CAPACITY", RollbackHistory::DEFAULT_CAPACITY)?,
        };

        let monitor_enabled = match std::env::var("MONITOR_ENABLED") {
            Ok(raw) => raw
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidValue("MONITOR_ENABLED", raw))?,
            Err(_) => false,
        };

        let monitor_target = ServiceName::Order;
        let monitor = MonitorSettings {
            service: monitor_target,
            target_version: std::env::var("MONITOR_TARGET_VERSION")
                .unwrap_or_else(|_| "v1.0".to_string()),
            poll_interval: duration_secs("MONITOR_POLL_INTERVAL_SECS", 5)?,
            window_size: parse_or("MONITOR_WINDOW_SIZE", 20)?,
            p95_threshold: Duration::from_millis(parse_or("MONITOR_P95_THRESHOLD_MS", 1500)?),
        };

        Ok(Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            service_version,
            environment,
            env_file,
            compose_file,
            service_urls,
            executor,
            monitor_enabled,
            monitor,
        })
    }

    /// Build the latency sampler the monitor uses.
    ///
    /// Defaults to `GET <order>/health`. The slow path in the `v1.1-bad`
    /// build only runs during order creation, so a realistic setup points
    /// `MONITOR_SAMPLE_METHOD=POST` and `MONITOR_SAMPLE_URL` at
    /// `POST /api/orders` with a `MONITOR_SAMPLE_BODY` payload.
    pub fn monitor_sampler(&self) -> Result<HttpLatencySampler, ConfigError> {
        let url = std::env::var("MONITOR_SAMPLE_URL").unwrap_or_else(|_| {
            let base = self
                .service_urls
                .get(&self.monitor.service)
                .cloned()
                .unwrap_or_else(|| {
                    format!("http://localhost:{}", self.monitor.service.default_port())
                });
            format!("{base}/health")
        });

        // Bound each sample well above the threshold: a wedged request turns
        // into a timed-out sample instead of stalling the monitor loop.
        let timeout = self.monitor.p95_threshold.saturating_mul(2);

        let method = std::env::var("MONITOR_SAMPLE_METHOD")
            .unwrap_or_else(|_| "GET".to_string())
            .to_uppercase();
        match method.as_str() {
            "GET" => Ok(HttpLatencySampler::get(url).with_timeout(timeout)),
            "POST" => {
                let body = match std::env::var("MONITOR_SAMPLE_BODY") {
                    Ok(raw) => serde_json::from_str(&raw)
                        .map_err(|_| ConfigError::InvalidValue("MONITOR_SAMPLE_BODY", raw))?,
                    Err(_) => serde_json::json!({}),
                };
                Ok(HttpLatencySampler::post(url, body).with_timeout(timeout))
            }
            _ => Err(ConfigError::InvalidValue("MONITOR_SAMPLE_METHOD", method)),
        }
    }
}

fn duration_secs(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parse_or(var, default)?))
}

fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(var, raw)),
        Err(_) => Ok(default),
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `WEBHOOK_PORT` is not a valid TCP port.
    #[error("invalid WEBHOOK_PORT: {0}")]
    InvalidPort(String),

    /// A numeric or boolean variable did not parse.
    #[error("invalid {0}: {1}")]
    InvalidValue(&'static str, String),

    /// `ROLLBACK_KNOWN_VERSIONS` resolved to an empty list.
    #[error("ROLLBACK_KNOWN_VERSIONS must name at least one version")]
    NoKnownVersions,
}
