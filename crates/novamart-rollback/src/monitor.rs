// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Background latency monitor that triggers automatic rollbacks.
//!
//! The monitor samples one endpoint on a fixed interval and keeps the last N
//! samples. Once the window is full, a p95 above the threshold triggers a
//! rollback of the watched service to the configured target version. The
//! window is cleared after a trigger so the freshly rolled-back service gets
//! judged on new samples only.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use novamart_core::ServiceName;

use crate::executor::{RollbackExecutor, RollbackRequest};

/// Errors from latency sampling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SampleError {
    /// The sampled request failed outright.
    #[error("sample request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The sampled request did not answer within the sampler's bound.
    #[error("sample request still pending after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Abstract latency sampler.
#[async_trait]
pub trait LatencySampler: Send + Sync + std::fmt::Debug {
    /// Take one latency sample.
    async fn sample(&self) -> Result<Duration, SampleError>;
}

/// Samples latency by timing a real HTTP request.
#[derive(Debug, Clone)]
pub struct HttpLatencySampler {
    client: reqwest::Client,
    method: reqwest::Method,
    url: String,
    body: Option<serde_json::Value>,
    timeout: Duration,
}

impl HttpLatencySampler {
    /// Default bound on a single sample request.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Sample with `GET url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            method: reqwest::Method::GET,
            url: url.into(),
            body: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sample with `POST url` and a fixed JSON body.
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            client: reqwest::Client::new(),
            method: reqwest::Method::POST,
            url: url.into(),
            body: Some(body),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Bound a single sample request. A request still pending at the bound
    /// is reported as [`SampleError::Timeout`] so one wedged endpoint cannot
    /// stall the monitor loop.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl LatencySampler for HttpLatencySampler {
    async fn sample(&self) -> Result<Duration, SampleError> {
        let started = Instant::now();
        let mut request = self
            .client
            .request(self.method.clone(), &self.url)
            .timeout(self.timeout);
        if let Some(body) = &self.body {
            request = request.json(body);
        }
        // Status is irrelevant: a fast 4xx is still a fast answer.
        match request.send().await {
            Ok(_) => Ok(started.elapsed()),
            Err(err) if err.is_timeout() => Err(SampleError::Timeout(self.timeout)),
            Err(err) => Err(err.into()),
        }
    }
}

/// Monitor settings.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Service to roll back when latency regresses.
    pub service: ServiceName,
    /// Version to roll back to.
    pub target_version: String,
    /// Delay between samples.
    pub poll_interval: Duration,
    /// Samples kept in the window.
    pub window_size: usize,
    /// p95 above this triggers a rollback.
    pub p95_threshold: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            service: ServiceName::Order,
            target_version: "v1.0".to_string(),
            poll_interval: Duration::from_secs(5),
            window_size: 20,
            p95_threshold: Duration::from_millis(1500),
        }
    }
}

/// Background worker watching order latency.
#[derive(Debug)]
pub struct LatencyMonitor {
    sampler: Arc<dyn LatencySampler>,
    executor: Arc<RollbackExecutor>,
    settings: MonitorSettings,
    window: Mutex<VecDeque<Duration>>,
    shutdown: Arc<Notify>,
}

impl LatencyMonitor {
    /// Create a monitor.
    pub fn new(
        sampler: Arc<dyn LatencySampler>,
        executor: Arc<RollbackExecutor>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            sampler,
            executor,
            settings,
            window: Mutex::new(VecDeque::new()),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle used to signal shutdown.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run the monitor loop until shutdown is signalled.
    pub async fn run(&self) {
        info!(
            service = %self.settings.service,
            target_version = %self.settings.target_version,
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            window_size = self.settings.window_size,
            p95_threshold_ms = self.settings.p95_threshold.as_millis() as u64,
            "Latency monitor started"
        );

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    info!("Latency monitor received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(self.settings.poll_interval) => {
                    self.tick().await;
                }
            }
        }

        info!("Latency monitor stopped");
    }

    /// Take one sample and trigger a rollback when the window's p95 regresses.
    pub async fn tick(&self) {
        let sample = match self.sampler.sample().await {
            Ok(sample) => sample,
            Err(SampleError::Timeout(bound)) => {
                // The endpoint is at least this slow; record the bound so a
                // wedged service still fills the window and triggers.
                warn!(
                    bound_ms = bound.as_millis() as u64,
                    "Latency sample timed out, recording at the bound"
                );
                bound
            }
            Err(err) => {
                // A dead endpoint is a rollout problem too, but latency is
                // the only signal this monitor acts on.
                warn!(error = %err, "Latency sample failed, skipping");
                return;
            }
        };

        let p95 = {
            let mut window = lock(&self.window);
            if window.len() == self.settings.window_size {
                window.pop_front();
            }
            window.push_back(sample);
            if window.len() < self.settings.window_size {
                debug!(
                    sample_ms = sample.as_millis() as u64,
                    filled = window.len(),
                    "Latency window still filling"
                );
                return;
            }
            p95_of(window.make_contiguous())
        };

        debug!(
            p95_ms = p95.as_millis() as u64,
            threshold_ms = self.settings.p95_threshold.as_millis() as u64,
            "Latency window evaluated"
        );

        if p95 <= self.settings.p95_threshold {
            return;
        }

        warn!(
            service = %self.settings.service,
            p95_ms = p95.as_millis() as u64,
            threshold_ms = self.settings.p95_threshold.as_millis() as u64,
            "Latency regression detected, triggering rollback"
        );

        let outcome = self
            .executor
            .execute(RollbackRequest {
                service: self.settings.service,
                target_version: self.settings.target_version.clone(),
                reason: Some(format!(
                    "p95 latency {}ms over threshold {}ms",
                    p95.as_millis(),
                    self.settings.p95_threshold.as_millis()
                )),
                alert_id: None,
            })
            .await;

        if !outcome.success {
            warn!(
                rollback_id = outcome.rollback_id,
                message = outcome.message,
                "Automatic rollback did not succeed"
            );
        }

        // Judge the rolled-back service on fresh samples only.
        lock(&self.window).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// p95 of a non-empty sample set, nearest-rank method.
fn p95_of(samples: &[Duration]) -> Duration {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let rank = ((sorted.len() as f64) * 0.95).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}
