// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP routes and handlers for the order service.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use novamart_core::health::{HealthResponse, ReadyResponse};
use novamart_core::ServiceName;

use crate::config::Config;
use crate::models::{CreateOrderRequest, OrderStatus};
use crate::service::OrderService;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
    /// Order orchestration and storage.
    pub service: OrderService,
}

/// Build the order service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{order_id}", get(get_order))
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

/// POST /api/orders
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> Response {
    if request.items.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "items must not be empty").into_response();
    }
    if request.amount <= Decimal::ZERO {
        return json_error(StatusCode::BAD_REQUEST, "amount must be positive").into_response();
    }

    match state.service.place_order(request).await {
        // A refused order is stored, but the caller still gets a 4xx with
        // the record (and its failure_reason) as the body.
        Ok(order) if order.status == OrderStatus::Failed => {
            (StatusCode::BAD_REQUEST, Json(order)).into_response()
        }
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(err) => {
            error!(error = %err, "Order orchestration failed");
            json_error(StatusCode::BAD_GATEWAY, "downstream service unavailable")
                .into_response()
        }
    }
}

/// GET /api/orders/{order_id}
async fn get_order(State(state): State<Arc<AppState>>, Path(order_id): Path<String>) -> Response {
    match state.service.get_order(&order_id).await {
        Some(order) => (StatusCode::OK, Json(order)).into_response(),
        None => {
            warn!(order_id, "Order not found");
            json_error(StatusCode::NOT_FOUND, &format!("Order {order_id} not found"))
                .into_response()
        }
    }
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::healthy(
        ServiceName::Order.as_str(),
        &state.config.service_version,
        &state.config.environment,
    ))
}

/// GET /ready
async fn ready(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert("service_initialized".to_string(), true);
    Json(ReadyResponse::from_checks(
        ServiceName::Order.as_str(),
        checks,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(inventory_url: &str, payment_url: &str) -> Arc<AppState> {
        let config = Config {
            listen_addr: ([0, 0, 0, 0], 0).into(),
            service_version: "v1.0".to_string(),
            environment: "test".to_string(),
            inventory_url: inventory_url.to_string(),
            payment_url: payment_url.to_string(),
            enable_bug: false,
        };
        Arc::new(AppState {
            service: OrderService::new(config.clone()),
            config,
        })
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

    fn order_body() -> serde_json::Value {
        serde_json::json!({
            "customer_id": "c-1",
            "items": [{ "item_id": "WIDGET-001", "quantity": 1 }],
            "amount": 29.99,
        })
    }

    #[tokio::test]
    async fn test_create_then_fetch_order() {
        let inventory = MockServer::start().await;
        let payment = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/api/inventory/reserve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reserved": true,
            })))
            .mount(&inventory)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/payments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "payment_id": "p-1", "status": "completed",
            })))
            .mount(&payment)
            .await;

        let router = router(state_for(&inventory.uri(), &payment.uri()));

        let (status, created) = send(&router, "POST", "/api/orders", Some(order_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "confirmed");

        let order_id = created["order_id"].as_str().unwrap();
        let (status, fetched) =
            send(&router, "GET", &format!("/api/orders/{order_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["order_id"], created["order_id"]);
    }

    #[tokio::test]
    async fn test_declined_payment_is_400_with_failed_record() {
        let inventory = MockServer::start().await;
        let payment = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/api/inventory/reserve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reserved": true,
            })))
            .mount(&inventory)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/payments"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": "Payment declined",
                "reason": "Payment declined by gateway - insufficient funds",
            })))
            .mount(&payment)
            .await;

        let router = router(state_for(&inventory.uri(), &payment.uri()));
        let (status, body) = send(&router, "POST", "/api/orders", Some(order_body())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["failure_reason"], "payment_declined");

        // The failed order is still queryable.
        let order_id = body["order_id"].as_str().unwrap();
        let (status, _) =
            send(&router, "GET", &format!("/api/orders/{order_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_items_rejected() {
        let router = router(state_for("http://localhost:1", "http://localhost:1"));
        let mut body = order_body();
        body["items"] = serde_json::json!([]);
        let (status, _) = send(&router, "POST", "/api/orders", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_downstream_outage_is_502() {
        // Nothing listens on these ports.
        let router = router(state_for("http://127.0.0.1:1", "http://127.0.0.1:1"));
        let (status, _) = send(&router, "POST", "/api/orders", Some(order_body())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unknown_order_404() {
        let router = router(state_for("http://localhost:1", "http://localhost:1"));
        let (status, _) = send(&router, "GET", "/api/orders/order-missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
