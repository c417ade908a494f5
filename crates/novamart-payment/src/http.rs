// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP routes and handlers for the payment service.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use novamart_core::health::{HealthResponse, ReadyResponse};
use novamart_core::ServiceName;

use crate::config::Config;
use crate::models::{PaymentRequest, PaymentResponse, PaymentStatus};
use crate::simulator::{Outcome, OutcomeSimulator};
use crate::store::PaymentStore;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
    /// Outcome simulator (pure; shared by value semantics).
    pub simulator: OutcomeSimulator,
    /// Payment storage.
    pub store: PaymentStore,
}

/// Build the payment service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/payments", post(process_payment))
        .route("/api/payments/{payment_id}", get(get_payment))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "error": message })))
}

async fn not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// POST /api/payments
async fn process_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaymentRequest>,
) -> Response {
    if request.amount <= Decimal::ZERO {
        return json_error(StatusCode::BAD_REQUEST, "amount must be positive").into_response();
    }

    let currency = request.currency.to_uppercase();
    let amount = request.amount.round_dp(2);

    info!(
        order_id = %request.order_id,
        amount = %amount,
        currency = %currency,
        customer_id = %request.customer_id,
        "Processing payment"
    );

    // Idempotency: never charge a completed order twice.
    if request.idempotency_key.is_some()
        && let Some(existing) = state.store.completed_for_order(&request.order_id).await
    {
        info!(
            order_id = %request.order_id,
            payment_id = %existing.payment_id,
            "Idempotent payment request, returning existing payment"
        );
        return (StatusCode::OK, Json(existing)).into_response();
    }

    let payment_id = Uuid::new_v4();
    let now = Utc::now();

    match state.simulator.decide(&request.order_id) {
        Outcome::Declined => {
            let failure_reason = "Payment declined by gateway - insufficient funds";
            let payment = PaymentResponse {
                payment_id,
                order_id: request.order_id.clone(),
                amount,
                currency,
                status: PaymentStatus::Failed,
                payment_method: request.payment_method,
                transaction_id: None,
                failure_reason: Some(failure_reason.to_string()),
                created_at: now,
                updated_at: now,
            };
            state.store.insert(payment).await;

            warn!(
                order_id = %request.order_id,
                payment_id = %payment_id,
                "Payment gateway declined payment"
            );

            (
                StatusCode::PAYMENT_REQUIRED,
                Json(serde_json::json!({
                    "error": "Payment declined",
                    "reason": failure_reason,
                    "payment_id": payment_id,
                })),
            )
                .into_response()
        }
        Outcome::Approved { transaction_ref } => {
            let payment = PaymentResponse {
                payment_id,
                order_id: request.order_id.clone(),
                amount,
                currency,
                status: PaymentStatus::Completed,
                payment_method: request.payment_method,
                transaction_id: Some(transaction_ref.clone()),
                failure_reason: None,
                created_at: now,
                updated_at: now,
            };
            state.store.insert(payment.clone()).await;

            info!(
                order_id = %request.order_id,
                payment_id = %payment_id,
                transaction_id = %transaction_ref,
                "Payment processed successfully"
            );

            (StatusCode::CREATED, Json(payment)).into_response()
        }
    }
}

/// GET /api/payments/{payment_id}
async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Response {
    match state.store.get(payment_id).await {
        Some(payment) => (StatusCode::OK, Json(payment)).into_response(),
        None => {
            warn!(payment_id = %payment_id, "Payment not found");
            json_error(
                StatusCode::NOT_FOUND,
                &format!("Payment {payment_id} not found"),
            )
            .into_response()
        }
    }
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::healthy(
        ServiceName::Payment.as_str(),
        &state.config.service_version,
        &state.config.environment,
    ))
}

/// GET /ready
async fn ready(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    // Stateless service: ready as soon as the process answers.
    let mut checks = BTreeMap::new();
    checks.insert("service_initialized".to_string(), true);
    Json(ReadyResponse::from_checks(
        ServiceName::Payment.as_str(),
        checks,
    ))
}
