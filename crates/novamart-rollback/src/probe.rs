// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Health probing for rollback verification.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use novamart_core::ServiceName;

/// What a probe saw on one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// The service answered and called itself healthy.
    pub healthy: bool,
    /// Version the service reported, when the payload carried one.
    pub version: Option<String>,
}

impl HealthReport {
    /// An unreachable or unhealthy service.
    pub fn down() -> Self {
        Self {
            healthy: false,
            version: None,
        }
    }

    /// A healthy service reporting the given version.
    pub fn healthy_at(version: &str) -> Self {
        Self {
            healthy: true,
            version: Some(version.to_string()),
        }
    }
}

/// Abstract health probe.
///
/// Probes never error: an unreachable service is an unhealthy report, not a
/// failure of the probe itself.
#[async_trait]
pub trait HealthProbe: Send + Sync + std::fmt::Debug {
    /// Probe one service once.
    async fn check(&self, service: ServiceName) -> HealthReport;
}

/// Probe hitting each service's `/health` endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    base_urls: HashMap<ServiceName, String>,
}

impl HttpHealthProbe {
    /// Probe timeout per attempt.
    pub const TIMEOUT: Duration = Duration::from_secs(2);

    /// Create a probe for the given service base URLs (no trailing slash).
    pub fn new(base_urls: HashMap<ServiceName, String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_urls,
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, service: ServiceName) -> HealthReport {
        let Some(base) = self.base_urls.get(&service) else {
            debug!(service = %service, "No base URL configured for probe");
            return HealthReport::down();
        };
        let url = format!("{base}/health");

        let response = match self
            .client
            .get(&url)
            .timeout(Self::TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(service = %service, status = %response.status(), "Probe got non-success");
                return HealthReport::down();
            }
            Err(err) => {
                debug!(service = %service, error = %err, "Probe request failed");
                return HealthReport::down();
            }
        };

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                debug!(service = %service, error = %err, "Probe payload unreadable");
                return HealthReport::down();
            }
        };

        HealthReport {
            healthy: body["status"].as_str() == Some("healthy"),
            version: body["version"].as_str().map(str::to_string),
        }
    }
}

/// Scripted probe for tests. Reports are consumed in order; the last one
/// repeats once the script runs out.
#[derive(Debug, Default)]
pub struct MockHealthProbe {
    script: Mutex<VecDeque<HealthReport>>,
    last: Mutex<Option<HealthReport>>,
}

impl MockHealthProbe {
    /// Probe that always reports healthy at the given version.
    pub fn always_healthy(version: &str) -> Self {
        let probe = Self::default();
        probe.push(HealthReport::healthy_at(version));
        probe
    }

    /// Probe that always reports the service down.
    pub fn always_down() -> Self {
        let probe = Self::default();
        probe.push(HealthReport::down());
        probe
    }

    /// Append a report to the script.
    pub fn push(&self, report: HealthReport) {
        lock(&self.script).push_back(report);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl HealthProbe for MockHealthProbe {
    async fn check(&self, _service: ServiceName) -> HealthReport {
        if let Some(report) = lock(&self.script).pop_front() {
            *lock(&self.last) = Some(report.clone());
            return report;
        }
        lock(&self.last).clone().unwrap_or_else(HealthReport::down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_script_then_repeat() {
        let probe = MockHealthProbe::default();
        probe.push(HealthReport::down());
        probe.push(HealthReport::healthy_at("v1.0"));

        assert!(!probe.check(ServiceName::Order).await.healthy);
        assert!(probe.check(ServiceName::Order).await.healthy);
        // Script exhausted: last report repeats.
        assert!(probe.check(ServiceName::Order).await.healthy);
    }

    #[tokio::test]
    async fn test_http_probe_reads_health_payload() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy",
                "service": "order-service",
                "version": "v1.0",
            })))
            .mount(&server)
            .await;

        let probe = HttpHealthProbe::new(HashMap::from([(ServiceName::Order, server.uri())]));
        let report = probe.check(ServiceName::Order).await;
        assert!(report.healthy);
        assert_eq!(report.version.as_deref(), Some("v1.0"));
    }

    #[tokio::test]
    async fn test_http_probe_unreachable_is_down() {
        let probe =
            HttpHealthProbe::new(HashMap::from([(ServiceName::Order, "http://127.0.0.1:1".to_string())]));
        assert_eq!(probe.check(ServiceName::Order).await, HealthReport::down());
    }
}
