// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! NovaMart Order Service
//!
//! Front door of the order flow. Each incoming order is orchestrated through
//! two downstream calls: an all-or-nothing stock reservation against the
//! inventory service, then a charge against the payment service. The order
//! record ends up `confirmed` only when both succeed; a refusal from either
//! downstream produces a `failed` record with the reason preserved.
//!
//! The `v1.1-bad` build (or `ORDER_SERVICE_ENABLE_BUG=true`) additionally
//! runs an extended per-order trace logging pass that adds roughly two
//! seconds of latency to every order. It exists so that latency-based
//! rollback automation has something real to detect.
//!
//! # Endpoints
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `POST /api/orders` | Place an order |
//! | `GET /api/orders/{order_id}` | Look up an order |
//! | `GET /health` | Liveness |
//! | `GET /ready` | Readiness |
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `ORDER_PORT` | No | `8080` | HTTP listen port |
//! | `SERVICE_VERSION` | No | `v1.0` | Version tag reported by /health |
//! | `ENVIRONMENT` | No | `local` | Deployment environment label |
//! | `INVENTORY_SERVICE_URL` | No | `http://localhost:8081` | Inventory base URL |
//! | `PAYMENT_SERVICE_URL` | No | `http://localhost:8082` | Payment base URL |
//! | `ORDER_SERVICE_ENABLE_BUG` | No | `false` | Force the slow trace logging path |

#![deny(missing_docs)]

/// Server configuration from environment variables.
pub mod config;

/// Typed clients for the inventory and payment services.
pub mod clients;

/// HTTP routes and handlers.
pub mod http;

/// Order wire models.
pub mod models;

/// Order orchestration.
pub mod service;

pub use config::Config;
pub use service::OrderService;
