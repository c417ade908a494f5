// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The rollback state machine.
//!
//! An attempt walks VALIDATING, UPDATING_CONFIG, RESTARTING, VERIFYING and
//! ends SUCCEEDED or FAILED. Failures map to [`RollbackErrorKind`] values.
//! Two invariants the rest of the system relies on:
//!
//! - At most one rollback runs per service at a time. A concurrent request
//!   is rejected with `rollback_in_progress` and changes nothing.
//! - A verification timeout leaves the env file at the target version. There
//!   is no automatic revert; the operator owns the next step.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use novamart_core::version_store::{EnvFileStore, VersionStoreError};
use novamart_core::ServiceName;

use crate::error::{Result, RollbackError, RollbackErrorKind};
use crate::history::{RollbackHistory, RollbackRecord};
use crate::probe::HealthProbe;
use crate::restart::ServiceRestarter;

/// A rollback request, from the webhook or the latency monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackRequest {
    /// Service to roll back.
    pub service: ServiceName,
    /// Version to roll to.
    pub target_version: String,
    /// Why the rollback was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Correlation id of the alert that triggered this request, threaded
    /// through logs and the history record's reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
}

/// Final report of one rollback attempt.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackOutcome {
    /// Identifier of the attempt.
    pub rollback_id: String,
    /// Service the attempt targeted.
    pub service: String,
    /// Version before the attempt, when readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_version: Option<String>,
    /// Version the attempt rolled to.
    pub to_version: String,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Failure kind when the attempt failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RollbackErrorKind>,
    /// Wall time the attempt took.
    pub duration_ms: u64,
}

/// Timeouts and limits for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Versions a request may roll to.
    pub known_versions: Vec<String>,
    /// Budget for the restart stage.
    pub restart_timeout: Duration,
    /// Budget for the verification stage.
    pub verify_timeout: Duration,
    /// Delay between verification probes.
    pub verify_interval: Duration,
    /// Rollback history ring size.
    pub history_capacity: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            known_versions: vec!["v1.0".to_string(), "v1.1-bad".to_string()],
            restart_timeout: Duration::from_secs(60),
            verify_timeout: Duration::from_secs(60),
            verify_interval: Duration::from_secs(2),
            history_capacity: RollbackHistory::DEFAULT_CAPACITY,
        }
    }
}

/// Executes rollbacks against the shared env file.
#[derive(Debug)]
pub struct RollbackExecutor {
    env_store: EnvFileStore,
    restarter: std::sync::Arc<dyn ServiceRestarter>,
    probe: std::sync::Arc<dyn HealthProbe>,
    settings: ExecutorSettings,
    history: RollbackHistory,
    in_flight: Mutex<HashSet<ServiceName>>,
}

impl RollbackExecutor {
    /// Build an executor.
    pub fn new(
        env_store: EnvFileStore,
        restarter: std::sync::Arc<dyn ServiceRestarter>,
        probe: std::sync::Arc<dyn HealthProbe>,
        settings: ExecutorSettings,
    ) -> Self {
        let history = RollbackHistory::new(settings.history_capacity);
        Self {
            env_store,
            restarter,
            probe,
            settings,
            history,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The rollback history.
    pub fn history(&self) -> &RollbackHistory {
        &self.history
    }

    /// Versions rollbacks may target.
    pub fn known_versions(&self) -> &[String] {
        &self.settings.known_versions
    }

    /// Current version of a service per the env file.
    pub async fn current_version(&self, service: ServiceName) -> Option<String> {
        self.env_store.get(service.version_key()).await.ok().flatten()
    }

    /// Run one rollback attempt to completion.
    ///
    /// Never returns an `Err`: every ending, including rejections, becomes a
    /// [`RollbackOutcome`] and a history record.
    pub async fn execute(&self, request: RollbackRequest) -> RollbackOutcome {
        let started = Instant::now();
        let rollback_id = format!(
            "rb-{}-{}",
            Utc::now().format("%Y%m%d-%H%M%S"),
            request.service
        );

        info!(
            rollback_id,
            service = %request.service,
            target_version = %request.target_version,
            reason = request.reason.as_deref().unwrap_or("-"),
            alert_id = request.alert_id.as_deref().unwrap_or("-"),
            "Rollback requested"
        );

        let (from_version, result) = match self.try_acquire(request.service) {
            Some(_guard) => self.run_stages(&rollback_id, &request).await,
            None => (
                None,
                Err(RollbackError::InProgress {
                    service: request.service.to_string(),
                }),
            ),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let outcome = match result {
            Ok(message) => {
                info!(rollback_id, duration_ms, "Rollback succeeded");
                RollbackOutcome {
                    rollback_id: rollback_id.clone(),
                    service: request.service.to_string(),
                    from_version: from_version.clone(),
                    to_version: request.target_version.clone(),
                    success: true,
                    message,
                    error_kind: None,
                    duration_ms,
                }
            }
            Err(err) => {
                let kind = err.kind();
                error!(rollback_id, kind = %kind, error = %err, duration_ms, "Rollback failed");
                RollbackOutcome {
                    rollback_id: rollback_id.clone(),
                    service: request.service.to_string(),
                    from_version: from_version.clone(),
                    to_version: request.target_version.clone(),
                    success: false,
                    message: err.to_string(),
                    error_kind: Some(kind),
                    duration_ms,
                }
            }
        };

        self.history.push(RollbackRecord {
            rollback_id,
            timestamp: Utc::now(),
            service: outcome.service.clone(),
            from_version,
            to_version: outcome.to_version.clone(),
            success: outcome.success,
            error_kind: outcome.error_kind,
            reason: request.reason,
            duration_ms,
        });

        outcome
    }

    /// Walk the stages. Returns the pre-rollback version alongside the result
    /// so failed attempts still report where they started.
    async fn run_stages(
        &self,
        rollback_id: &str,
        request: &RollbackRequest,
    ) -> (Option<String>, Result<String>) {
        let service = request.service;
        let target = &request.target_version;

        // VALIDATING
        if !self.env_store.exists().await {
            return (
                None,
                Err(RollbackError::Validation(format!(
                    "version config {} not found",
                    self.env_store.path().display()
                ))),
            );
        }
        if !self.env_store.writable().await {
            return (
                None,
                Err(RollbackError::Validation(format!(
                    "version config {} is not writable",
                    self.env_store.path().display()
                ))),
            );
        }
        if !self.settings.known_versions.iter().any(|v| v == target) {
            return (
                None,
                Err(RollbackError::Validation(format!(
                    "unknown target version {target}, known: {}",
                    self.settings.known_versions.join(", ")
                ))),
            );
        }

        let from_version = match self.env_store.get(service.version_key()).await {
            Ok(version) => version,
            Err(VersionStoreError::NotFound(_)) => None,
            Err(err) => return (None, Err(err.into())),
        };

        if from_version.as_deref() == Some(target.as_str()) {
            info!(rollback_id, service = %service, version = %target, "Already at target version");
            return (
                from_version,
                Ok(format!("{service} already at {target}, nothing to do")),
            );
        }

        // UPDATING_CONFIG
        info!(rollback_id, service = %service, "Updating version config");
        if let Err(err) = self.env_store.set(service.version_key(), target).await {
            return (from_version, Err(err.into()));
        }

        // RESTARTING
        info!(
            rollback_id,
            service = %service,
            restarter = self.restarter.restarter_type(),
            "Restarting service"
        );
        match tokio::time::timeout(self.settings.restart_timeout, self.restarter.restart(service))
            .await
        {
            Ok(Ok(summary)) => info!(rollback_id, summary, "Restart completed"),
            Ok(Err(err)) => return (from_version, Err(err.into())),
            Err(_) => {
                return (
                    from_version,
                    Err(RollbackError::RestartTimeout {
                        seconds: self.settings.restart_timeout.as_secs(),
                    }),
                );
            }
        }

        // VERIFYING
        info!(rollback_id, service = %service, "Verifying health at target version");
        let deadline = tokio::time::Instant::now() + self.settings.verify_timeout;
        loop {
            let report = self.probe.check(service).await;
            let version_ok = report
                .version
                .as_deref()
                .is_none_or(|version| version == target);
            if report.healthy && version_ok {
                return (
                    from_version,
                    Ok(format!("{service} healthy at {target}")),
                );
            }
            if tokio::time::Instant::now() >= deadline {
                warn!(
                    rollback_id,
                    service = %service,
                    "Verification timed out, env file keeps the target version"
                );
                return (
                    from_version,
                    Err(RollbackError::VerificationTimeout {
                        seconds: self.settings.verify_timeout.as_secs(),
                        target_version: target.clone(),
                    }),
                );
            }
            tokio::time::sleep(self.settings.verify_interval).await;
        }
    }

    fn try_acquire(&self, service: ServiceName) -> Option<FlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !in_flight.insert(service) {
            return None;
        }
        Some(FlightGuard {
            set: &self.in_flight,
            service,
        })
    }
}

/// Releases the per-service rollback slot on drop, including on panic.
struct FlightGuard<'a> {
    set: &'a Mutex<HashSet<ServiceName>>,
    service: ServiceName,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.service);
    }
}
