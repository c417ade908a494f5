// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! NovaMart Rollback Webhook
//!
//! Rolls a misbehaving service back to a known version by rewriting the
//! shared env file, recreating the service through the restart backend, and
//! verifying it comes back healthy at the target version. A built-in latency
//! monitor can trigger the same rollback automatically when order latency
//! regresses.
//!
//! ```text
//!                     POST /rollback
//!  operator ────────────┐
//!                       ▼
//!               ┌──────────────────┐     VALIDATING
//!  latency ───▶ │ RollbackExecutor │     UPDATING_CONFIG
//!  monitor      └──────────────────┘     RESTARTING
//!                  │         │           VERIFYING
//!                  ▼         ▼
//!            env file   restart backend ──▶ docker compose up -d --no-deps
//!            (.env)     (health probe verifies /health afterwards)
//! ```
//!
//! One rollback per service runs at a time; a concurrent request is rejected
//! with `rollback_in_progress`. A failed verification never reverts the env
//! file.
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `WEBHOOK_PORT` | No | `9000` | HTTP listen port |
//! | `SERVICE_VERSION` | No | `v1.0` | Version tag reported by /health |
//! | `ENVIRONMENT` | No | `local` | Deployment environment label |
//! | `ENV_FILE` | No | `/app/infra/.env` | Shared env file with version keys |
//! | `COMPOSE_FILE` | No | `/app/infra/docker-compose.yml` | Compose file for restarts |
//! | `ROLLBACK_KNOWN_VERSIONS` | No | `v1.0,v1.1-bad` | Versions rollbacks may target |
//! | `RESTART_TIMEOUT_SECS` | No | `60` | Restart stage budget |
//! | `VERIFY_TIMEOUT_SECS` | No | `60` | Verification stage budget |
//! | `VERIFY_INTERVAL_SECS` | No | `2` | Delay between verification probes |
//! | `ROLLBACK_HISTORY_CAPACITY` | No | `100` | History ring size |
//! | `ORDER_SERVICE_URL` | No | `http://localhost:8080` | Order base URL |
//! | `INVENTORY_SERVICE_URL` | No | `http://localhost:8081` | Inventory base URL |
//! | `PAYMENT_SERVICE_URL` | No | `http://localhost:8082` | Payment base URL |
//! | `MONITOR_ENABLED` | No | `false` | Run the latency monitor |
//! | `MONITOR_TARGET_VERSION` | No | `v1.0` | Version the monitor rolls back to |
//! | `MONITOR_POLL_INTERVAL_SECS` | No | `5` | Delay between latency samples |
//! | `MONITOR_WINDOW_SIZE` | No | `20` | Samples per latency window |
//! | `MONITOR_P95_THRESHOLD_MS` | No | `1500` | p95 that triggers a rollback |
//! | `MONITOR_SAMPLE_URL` | No | order `/health` | Endpoint the monitor times |
//! | `MONITOR_SAMPLE_METHOD` | No | `GET` | `GET` or `POST` |
//! | `MONITOR_SAMPLE_BODY` | No | `{}` | JSON body for `POST` samples |

#![deny(missing_docs)]

/// Server configuration from environment variables.
pub mod config;

/// Rollback error taxonomy.
pub mod error;

/// The rollback state machine.
pub mod executor;

/// Bounded rollback history.
pub mod history;

/// HTTP routes and handlers.
pub mod http;

/// Latency monitor triggering automatic rollbacks.
pub mod monitor;

/// Health probing for verification.
pub mod probe;

/// Service restart backends.
pub mod restart;

pub use config::Config;
pub use error::{RollbackError, RollbackErrorKind};
pub use executor::{ExecutorSettings, RollbackExecutor, RollbackOutcome, RollbackRequest};
