// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bounded in-memory rollback history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RollbackErrorKind;

/// One completed rollback attempt, success or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackRecord {
    /// Identifier of the attempt, `rb-<timestamp>-<service>`.
    pub rollback_id: String,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
    /// Service the rollback targeted.
    pub service: String,
    /// Version recorded before the attempt, when readable.
    pub from_version: Option<String>,
    /// Version the attempt rolled to.
    pub to_version: String,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Failure kind when the attempt failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RollbackErrorKind>,
    /// Operator- or monitor-supplied reason for the rollback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Wall time the attempt took.
    pub duration_ms: u64,
}

/// Ring buffer of recent rollback attempts plus an all-time counter.
#[derive(Debug, Clone)]
pub struct RollbackHistory {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Inner {
    records: VecDeque<RollbackRecord>,
    total: u64,
}

impl RollbackHistory {
    /// Default number of records retained.
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Create a history retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            capacity: capacity.max(1),
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn push(&self, record: RollbackRecord) {
        let mut inner = self.lock();
        if inner.records.len() == self.capacity {
            inner.records.pop_front();
        }
        inner.records.push_back(record);
        inner.total += 1;
    }

    /// Records currently retained, oldest first.
    pub fn records(&self) -> Vec<RollbackRecord> {
        self.lock().records.iter().cloned().collect()
    }

    /// All-time number of attempts, including evicted ones.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for RollbackHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> RollbackRecord {
        RollbackRecord {
            rollback_id: id.to_string(),
            timestamp: Utc::now(),
            service: "order-service".to_string(),
            from_version: Some("v1.1-bad".to_string()),
            to_version: "v1.0".to_string(),
            success: true,
            error_kind: None,
            reason: None,
            duration_ms: 1200,
        }
    }

    #[test]
    fn test_push_and_read_back() {
        let history = RollbackHistory::new(10);
        history.push(record("rb-1"));
        history.push(record("rb-2"));

        let records = history.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rollback_id, "rb-1");
        assert_eq!(history.total(), 2);
    }

    #[test]
    fn test_eviction_keeps_total() {
        let history = RollbackHistory::new(3);
        for i in 0..5 {
            history.push(record(&format!("rb-{i}")));
        }

        let records = history.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].rollback_id, "rb-2");
        assert_eq!(history.total(), 5);
    }

    #[test]
    fn test_failed_record_serializes_kind() {
        let mut failed = record("rb-1");
        failed.success = false;
        failed.error_kind = Some(RollbackErrorKind::RestartTimeoutError);

        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["error_kind"], "restart_timeout_error");
    }
}
