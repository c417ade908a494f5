// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP surface of the rollback webhook.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use novamart_core::health::{HealthResponse, ReadyResponse};
use novamart_core::ServiceName;

use crate::config::Config;
use crate::executor::{RollbackExecutor, RollbackRequest};
use crate::restart::ServiceRestarter;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Webhook configuration.
    pub config: Config,
    /// The rollback executor.
    pub executor: Arc<RollbackExecutor>,
    /// Restart backend, probed for readiness.
    pub restarter: Arc<dyn ServiceRestarter>,
}

/// Build the webhook router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/rollback", post(rollback))
        .route("/status", get(status))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}

/// GET /
async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "rollback-webhook",
        "endpoints": {
            "POST /rollback": "execute a rollback",
            "GET /status": "current versions and rollback history",
            "GET /health": "liveness",
            "GET /ready": "readiness",
        },
    }))
}

/// POST /rollback
async fn rollback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RollbackRequest>,
) -> Response {
    let outcome = state.executor.execute(request).await;
    let status = match outcome.error_kind {
        None => StatusCode::OK,
        Some(kind) => StatusCode::from_u16(kind.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    (status, Json(outcome)).into_response()
}

/// GET /status
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut current_versions = BTreeMap::new();
    for service in ServiceName::ALL {
        current_versions.insert(
            service.as_str(),
            state.executor.current_version(service).await,
        );
    }

    let history = state.executor.history();
    Json(serde_json::json!({
        "service": "rollback-webhook",
        "current_versions": current_versions,
        "known_versions": state.executor.known_versions(),
        "history": history.records(),
        "total_rollbacks": history.total(),
    }))
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::healthy(
        "rollback-webhook",
        &state.config.service_version,
        &state.config.environment,
    ))
}

/// GET /ready
///
/// Ready means the webhook can actually execute a rollback: the env file is
/// reachable and a restart backend exists on this host.
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert(
        "env_file".to_string(),
        tokio::fs::try_exists(&state.config.env_file)
            .await
            .unwrap_or(false),
    );
    checks.insert(
        "compose_file".to_string(),
        tokio::fs::try_exists(&state.config.compose_file)
            .await
            .unwrap_or(false),
    );
    checks.insert(
        "restarter".to_string(),
        state.restarter.is_available().await,
    );

    let response = ReadyResponse::from_checks("rollback-webhook", checks);
    let status = if response.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
