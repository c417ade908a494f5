// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP routes and handlers for the inventory service.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::warn;

use novamart_core::health::{HealthResponse, ReadyResponse};
use novamart_core::ServiceName;

use crate::config::Config;
use crate::data::{InventoryStore, ReserveError};
use crate::models::{CheckRequest, ReserveRequest, ReserveResponse};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
    /// Catalog storage.
    pub store: InventoryStore,
}

/// Build the inventory service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/inventory", get(list_inventory))
        .route("/api/inventory/summary", get(summary))
        .route("/api/inventory/{item_id}", get(get_item))
        .route("/api/inventory/check", post(check))
        .route("/api/inventory/reserve", post(reserve))
        .route("/api/inventory/release", post(release))
        .route("/api/inventory/reset", post(reset))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "error": message })))
}

async fn not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /api/inventory
async fn list_inventory(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let items = state.store.list().await;
    Json(serde_json::json!({ "items": items }))
}

/// GET /api/inventory/summary
async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.summary().await)
}

/// POST /api/inventory/check
async fn check(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckRequest>,
) -> impl IntoResponse {
    Json(state.store.check(&request.items).await)
}

/// GET /api/inventory/{item_id}
async fn get_item(State(state): State<Arc<AppState>>, Path(item_id): Path<String>) -> Response {
    match state.store.get(&item_id).await {
        Some(item) => (StatusCode::OK, Json(item)).into_response(),
        None => {
            warn!(item_id, "Item not found");
            json_error(StatusCode::NOT_FOUND, &format!("Item {item_id} not found"))
                .into_response()
        }
    }
}

/// POST /api/inventory/reserve
async fn reserve(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReserveRequest>,
) -> Response {
    if request.items.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "items must not be empty").into_response();
    }
    if request.items.iter().any(|line| line.quantity == 0) {
        return json_error(StatusCode::BAD_REQUEST, "quantity must be positive").into_response();
    }

    match state.store.reserve(&request.order_id, &request.items).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReserveResponse {
                reserved: true,
                order_id: request.order_id,
                items: request.items,
            }),
        )
            .into_response(),
        Err(ReserveError::UnknownItem(item_id)) => {
            json_error(StatusCode::NOT_FOUND, &format!("Item {item_id} not found"))
                .into_response()
        }
        Err(ReserveError::InsufficientStock(short)) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": "insufficient inventory",
                "unavailable_items": short,
            })),
        )
            .into_response(),
    }
}

/// POST /api/inventory/release
async fn release(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReserveRequest>,
) -> Response {
    if request.items.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "items must not be empty").into_response();
    }
    state.store.release(&request.order_id, &request.items).await;
    Json(serde_json::json!({
        "released": true,
        "order_id": request.order_id,
    }))
    .into_response()
}

/// POST /api/inventory/reset
async fn reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.reset().await;
    Json(serde_json::json!({ "reset": true }))
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::healthy(
        ServiceName::Inventory.as_str(),
        &state.config.service_version,
        &state.config.environment,
    ))
}

/// GET /ready
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert(
        "catalog_loaded".to_string(),
        !state.store.list().await.is_empty(),
    );
    Json(ReadyResponse::from_checks(
        ServiceName::Inventory.as_str(),
        checks,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(Arc::new(AppState {
            config: Config {
                listen_addr: ([0, 0, 0, 0], 0).into(),
                service_version: "v1.0".to_string(),
                environment: "test".to_string(),
            },
            store: InventoryStore::seeded(),
        }))
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                axum::body::Body::from(value.to_string())
            }
            None => axum::body::Body::empty(),
        };
        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_returns_seed_catalog() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/api/inventory", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_check_reports_availability_without_reserving() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/api/inventory/check",
            Some(serde_json::json!({
                "items": [
                    { "item_id": "WIDGET-001", "quantity": 5 },
                    { "item_id": "GADGET-042", "quantity": 9999 },
                ],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["available"], false);
        assert_eq!(body["items"][0]["available"], true);
        assert_eq!(body["items"][1]["available"], false);

        let (_, item) = send(&router, "GET", "/api/inventory/WIDGET-001", None).await;
        assert_eq!(item["quantity"], 1000);
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/api/inventory/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_skus"], 3);
        assert_eq!(body["total_units"], 1750);
    }

    #[tokio::test]
    async fn test_get_unknown_item_404() {
        let router = test_router();
        let (status, _) = send(&router, "GET", "/api/inventory/NOPE-000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reserve_then_stock_drops() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/api/inventory/reserve",
            Some(serde_json::json!({
                "order_id": "order-1",
                "items": [{ "item_id": "WIDGET-001", "quantity": 5 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reserved"], true);

        let (_, item) = send(&router, "GET", "/api/inventory/WIDGET-001", None).await;
        assert_eq!(item["quantity"], 995);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_409() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/api/inventory/reserve",
            Some(serde_json::json!({
                "order_id": "order-1",
                "items": [{ "item_id": "GADGET-042", "quantity": 9999 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["unavailable_items"][0], "GADGET-042");
    }

    #[tokio::test]
    async fn test_reserve_zero_quantity_400() {
        let router = test_router();
        let (status, _) = send(
            &router,
            "POST",
            "/api/inventory/reserve",
            Some(serde_json::json!({
                "order_id": "order-1",
                "items": [{ "item_id": "WIDGET-001", "quantity": 0 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_release_returns_reserved_stock() {
        let router = test_router();
        send(
            &router,
            "POST",
            "/api/inventory/reserve",
            Some(serde_json::json!({
                "order_id": "order-1",
                "items": [{ "item_id": "WIDGET-001", "quantity": 5 }],
            })),
        )
        .await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/inventory/release",
            Some(serde_json::json!({
                "order_id": "order-1",
                "items": [{ "item_id": "WIDGET-001", "quantity": 5 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["released"], true);

        let (_, item) = send(&router, "GET", "/api/inventory/WIDGET-001", None).await;
        assert_eq!(item["quantity"], 1000);
    }

    #[tokio::test]
    async fn test_reset_restores_stock() {
        let router = test_router();
        send(
            &router,
            "POST",
            "/api/inventory/reserve",
            Some(serde_json::json!({
                "order_id": "order-1",
                "items": [{ "item_id": "WIDGET-002", "quantity": 100 }],
            })),
        )
        .await;
        let (status, _) = send(&router, "POST", "/api/inventory/reset", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, item) = send(&router, "GET", "/api/inventory/WIDGET-002", None).await;
        assert_eq!(item["quantity"], 500);
    }
}
