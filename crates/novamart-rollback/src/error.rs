// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rollback error taxonomy.
//!
//! Every failure mode of a rollback attempt maps to a stable machine-readable
//! kind string, reported in webhook responses and in the rollback history so
//! that operators and tooling can branch on it.

use novamart_core::version_store::VersionStoreError;
use serde::{Deserialize, Serialize};

use crate::restart::RestartError;

/// Result type for rollback operations.
pub type Result<T> = std::result::Result<T, RollbackError>;

/// Errors from a rollback attempt.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RollbackError {
    /// The request failed validation before any state changed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The env file could not be updated.
    #[error("failed to write version config: {0}")]
    ConfigWrite(#[from] VersionStoreError),

    /// The restarter reported failure.
    #[error("restart failed: {0}")]
    RestartFailed(#[from] RestartError),

    /// The restart did not complete within the configured timeout.
    #[error("restart timed out after {seconds}s")]
    RestartTimeout {
        /// Configured restart timeout.
        seconds: u64,
    },

    /// The service never became healthy at the target version.
    ///
    /// The env file keeps the target version. There is no automatic revert;
    /// the operator decides the next step.
    #[error("verification timed out after {seconds}s, service did not become healthy at {target_version}")]
    VerificationTimeout {
        /// Configured verification timeout.
        seconds: u64,
        /// Version that was being verified.
        target_version: String,
    },

    /// Another rollback for the same service is still running.
    #[error("a rollback for {service} is already in progress")]
    InProgress {
        /// Service with the running rollback.
        service: String,
    },
}

impl RollbackError {
    /// Machine-readable kind for this error.
    pub fn kind(&self) -> RollbackErrorKind {
        match self {
            Self::Validation(_) => RollbackErrorKind::ValidationError,
            Self::ConfigWrite(_) => RollbackErrorKind::ConfigWriteError,
            Self::RestartFailed(_) => RollbackErrorKind::RestartFailed,
            Self::RestartTimeout { .. } => RollbackErrorKind::RestartTimeoutError,
            Self::VerificationTimeout { .. } => RollbackErrorKind::VerificationTimeoutError,
            Self::InProgress { .. } => RollbackErrorKind::RollbackInProgress,
        }
    }
}

/// Stable machine-readable rollback failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackErrorKind {
    /// Request rejected before any state changed.
    ValidationError,
    /// Env file update failed.
    ConfigWriteError,
    /// Restarter reported failure.
    RestartFailed,
    /// Restart exceeded its timeout.
    RestartTimeoutError,
    /// Health verification exceeded its timeout.
    VerificationTimeoutError,
    /// Concurrent rollback for the same service.
    RollbackInProgress,
}

impl RollbackErrorKind {
    /// Wire string used in responses and history records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::ConfigWriteError => "config_write_error",
            Self::RestartFailed => "restart_failed",
            Self::RestartTimeoutError => "restart_timeout_error",
            Self::VerificationTimeoutError => "verification_timeout_error",
            Self::RollbackInProgress => "rollback_in_progress",
        }
    }

    /// HTTP status the webhook answers with for this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::RollbackInProgress => 409,
            Self::ConfigWriteError => 500,
            Self::RestartFailed => 502,
            Self::RestartTimeoutError | Self::VerificationTimeoutError => 504,
        }
    }
}

impl std::fmt::Display for RollbackErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_strings() {
        assert_eq!(RollbackErrorKind::ValidationError.as_str(), "validation_error");
        assert_eq!(
            RollbackErrorKind::VerificationTimeoutError.as_str(),
            "verification_timeout_error"
        );
        assert_eq!(RollbackErrorKind::RollbackInProgress.as_str(), "rollback_in_progress");
    }

    #[test]
    fn test_kind_http_statuses() {
        assert_eq!(RollbackErrorKind::ValidationError.http_status(), 400);
        assert_eq!(RollbackErrorKind::RollbackInProgress.http_status(), 409);
        assert_eq!(RollbackErrorKind::ConfigWriteError.http_status(), 500);
        assert_eq!(RollbackErrorKind::RestartFailed.http_status(), 502);
        assert_eq!(RollbackErrorKind::RestartTimeoutError.http_status(), 504);
        assert_eq!(RollbackErrorKind::VerificationTimeoutError.http_status(), 504);
    }

    #[test]
    fn test_error_to_kind() {
        let err = RollbackError::Validation("bad version".to_string());
        assert_eq!(err.kind(), RollbackErrorKind::ValidationError);

        let err = RollbackError::VerificationTimeout {
            seconds: 60,
            target_version: "v1.0".to_string(),
        };
        assert_eq!(err.kind(), RollbackErrorKind::VerificationTimeoutError);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(RollbackErrorKind::RestartTimeoutError).unwrap(),
            serde_json::json!("restart_timeout_error")
        );
    }
}
