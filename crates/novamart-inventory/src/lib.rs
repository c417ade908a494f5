// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! NovaMart Inventory Service
//!
//! Tracks a small in-memory catalog and reserves stock for orders. A
//! reservation is all-or-nothing: every line of the request is verified
//! against current stock while a single lock is held, and only if all lines
//! fit is any quantity deducted. Partial reservations never happen.
//!
//! # Endpoints
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `GET /api/inventory` | List all catalog items |
//! | `GET /api/inventory/summary` | Stock totals and catalog snapshot |
//! | `GET /api/inventory/{item_id}` | Look up one item |
//! | `POST /api/inventory/check` | Availability report, no reservation |
//! | `POST /api/inventory/reserve` | Reserve stock for an order (all-or-nothing) |
//! | `POST /api/inventory/release` | Return a failed order's reserved stock |
//! | `POST /api/inventory/reset` | Restore the seeded catalog |
//! | `GET /health` | Liveness |
//! | `GET /ready` | Readiness |
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `INVENTORY_PORT` | No | `8081` | HTTP listen port |
//! | `SERVICE_VERSION` | No | `v1.0` | Version tag reported by /health |
//! | `ENVIRONMENT` | No | `local` | Deployment environment label |

#![deny(missing_docs)]

/// Server configuration from environment variables.
pub mod config;

/// In-memory catalog state and reservation logic.
pub mod data;

/// HTTP routes and handlers.
pub mod http;

/// Inventory wire models.
pub mod models;

pub use config::Config;
pub use data::InventoryStore;
