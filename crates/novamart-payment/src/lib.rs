// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! NovaMart Payment Service
//!
//! Simulates a payment gateway for the order flow. Outcomes are decided by a
//! deterministic hash of the order id (see [`simulator`]) so that a given
//! order always succeeds or always fails, across restarts and across
//! processes, while the population-level failure rate stays at the configured
//! target (default 1%).
//!
//! # Endpoints
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `POST /api/payments` | Process a payment (201 approved, 402 declined) |
//! | `GET /api/payments/{payment_id}` | Look up a payment by id |
//! | `GET /health` | Liveness |
//! | `GET /ready` | Readiness |
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `PAYMENT_PORT` | No | `8082` | HTTP listen port |
//! | `SERVICE_VERSION` | No | `v1.0` | Version tag reported by /health |
//! | `ENVIRONMENT` | No | `local` | Deployment environment label |
//! | `PAYMENT_FAILURE_RATE` | No | `0.01` | Target decline rate in `[0, 1]` |

#![deny(missing_docs)]

/// Server configuration from environment variables.
pub mod config;

/// HTTP routes and handlers.
pub mod http;

/// Payment request/response wire models.
pub mod models;

/// Deterministic payment outcome simulation.
pub mod simulator;

/// In-memory payment storage.
pub mod store;

pub use config::Config;
pub use simulator::OutcomeSimulator;
