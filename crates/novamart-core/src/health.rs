// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Health and readiness wire models.
//!
//! Every service exposes `GET /health` and `GET /ready` with these shapes.
//! The rollback verifier parses the same payload after a restart, so the
//! `version` field must reflect the `SERVICE_VERSION` the process read at
//! boot - not the value currently in the env file.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness response: the process is up and answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status string (`healthy` when alive).
    pub status: String,
    /// Service name.
    pub service: String,
    /// Version tag the process was started with.
    pub version: String,
    /// Deployment environment (`local`, `instruqt`, ...).
    pub environment: String,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// A healthy response for the given service identity.
    pub fn healthy(service: &str, version: &str, environment: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            environment: environment.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Whether this report counts as healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Readiness response: liveness plus dependency checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Whether every individual check passed.
    pub ready: bool,
    /// Service name.
    pub service: String,
    /// Named dependency checks (stable iteration order for display).
    pub checks: BTreeMap<String, bool>,
}

impl ReadyResponse {
    /// Build a readiness response; `ready` is the conjunction of all checks.
    pub fn from_checks(service: &str, checks: BTreeMap<String, bool>) -> Self {
        let ready = checks.values().all(|ok| *ok);
        Self {
            ready,
            service: service.to_string(),
            checks,
        }
    }
}
