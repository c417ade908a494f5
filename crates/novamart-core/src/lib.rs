// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! NovaMart Core - Shared Types for the Service Stack
//!
//! Types used by more than one service in the NovaMart stack:
//!
//! - [`service`]: the closed set of deployable services and their wire names
//! - [`version_store`]: the flat `KEY=VALUE` file holding each service's
//!   active version tag
//! - [`health`]: health/readiness response models shared by every service's
//!   HTTP surface (and read back by the rollback verifier)
//!
//! # Version State
//!
//! Each service's active version is a single `{SERVICE}_VERSION=vX.Y` line in
//! a shared env file. The file is an external contract: docker compose and
//! shell tooling read and edit the same file, so writers must preserve
//! unrelated lines and must never expose a half-written file. A running
//! service reads its version exactly once at boot; changing the file has no
//! effect until the service is restarted.

#![deny(missing_docs)]

/// Deployable service identities and their derived names.
pub mod service;

/// Flat `KEY=VALUE` version-state file with atomic updates.
pub mod version_store;

/// Health and readiness wire models.
pub mod health;

pub use service::ServiceName;
pub use version_store::EnvFileStore;
