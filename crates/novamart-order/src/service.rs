// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Order orchestration: inventory reservation, then payment.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{ChargeOutcome, ClientError, InventoryClient, PaymentClient, ReserveOutcome};
use crate::config::Config;
use crate::models::{CreateOrderRequest, OrderLine, OrderResponse, OrderStatus};

/// Failure reason recorded when the reservation is refused.
pub const REASON_INVENTORY: &str = "inventory_unavailable";
/// Failure reason recorded when the gateway declines the charge.
pub const REASON_PAYMENT: &str = "payment_declined";

/// Orchestrates the order flow and stores order records in memory.
#[derive(Debug, Clone)]
pub struct OrderService {
    config: Config,
    inventory: InventoryClient,
    payment: PaymentClient,
    orders: Arc<RwLock<HashMap<String, OrderResponse>>>,
}

impl OrderService {
    /// Build the service and its downstream clients from configuration.
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::new();
        Self {
            inventory: InventoryClient::new(config.inventory_url.clone(), client.clone()),
            payment: PaymentClient::new(config.payment_url.clone(), client),
            config,
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Place an order: reserve stock, charge the customer, record the result.
    ///
    /// Downstream refusals produce a stored `failed` order; only transport
    /// failures bubble up as errors.
    pub async fn place_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ClientError> {
        let order_id = format!("order-{}", Uuid::new_v4());
        let now = Utc::now();

        info!(
            order_id,
            customer_id = %request.customer_id,
            amount = %request.amount,
            lines = request.items.len(),
            "Placing order"
        );

        if self.config.bug_active() {
            self.detailed_trace_logging(&order_id, request.amount).await;
        }

        let mut order = OrderResponse {
            order_id: order_id.clone(),
            customer_id: request.customer_id.clone(),
            items: request.items.clone(),
            amount: request.amount,
            currency: "USD".to_string(),
            status: OrderStatus::Pending,
            failure_reason: None,
            payment_id: None,
            created_at: now,
            updated_at: now,
        };

        match self.inventory.reserve(&order_id, &request.items).await? {
            ReserveOutcome::Reserved => {}
            ReserveOutcome::Unavailable(short) => {
                warn!(order_id, short = ?short, "Order failed, inventory unavailable");
                order.status = OrderStatus::Failed;
                order.failure_reason = Some(REASON_INVENTORY.to_string());
                order.updated_at = Utc::now();
                self.store(order.clone()).await;
                return Ok(order);
            }
        }

        let charge = match self
            .payment
            .charge(&order_id, &request.customer_id, request.amount)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                // The customer was never charged; hand the stock back
                // before surfacing the transport failure.
                self.release_reservation(&order_id, &request.items).await;
                return Err(err);
            }
        };

        match charge {
            ChargeOutcome::Approved { payment_id } => {
                info!(order_id, payment_id, "Order confirmed");
                order.status = OrderStatus::Confirmed;
                order.payment_id = Some(payment_id);
            }
            ChargeOutcome::Declined { reason } => {
                warn!(order_id, reason, "Order failed, payment declined");
                self.release_reservation(&order_id, &request.items).await;
                order.status = OrderStatus::Failed;
                order.failure_reason = Some(REASON_PAYMENT.to_string());
            }
        }

        order.updated_at = Utc::now();
        self.store(order.clone()).await;
        Ok(order)
    }

    /// Look up an order record by id.
    pub async fn get_order(&self, order_id: &str) -> Option<OrderResponse> {
        self.orders.read().await.get(order_id).cloned()
    }

    /// Extended per-order trace logging introduced in v1.1.
    ///
    /// Walks the checkout state and logs each step at trace level. The walk
    /// is synchronous and slow; it holds up the order for about two seconds.
    async fn detailed_trace_logging(&self, order_id: &str, amount: Decimal) {
        for step in ["intake", "fraud_scan", "pricing", "ledger", "dispatch_plan"] {
            tracing::trace!(order_id, step, amount = %amount, "Order trace checkpoint");
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
    }

    /// Best-effort compensation for a reservation whose order failed.
    ///
    /// A release failure is logged and swallowed: the order already failed
    /// and the operator can reconcile stock via the inventory reset.
    async fn release_reservation(&self, order_id: &str, items: &[OrderLine]) {
        if let Err(err) = self.inventory.release(order_id, items).await {
            warn!(order_id, error = %err, "Failed to release reservation");
        }
    }

    async fn store(&self, order: OrderResponse) {
        self.orders
            .write()
            .await
            .insert(order.order_id.clone(), order);
    }
}
