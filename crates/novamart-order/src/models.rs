// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted but not yet orchestrated.
    Pending,
    /// Stock reserved and payment completed.
    Confirmed,
    /// Refused by inventory or payment.
    Failed,
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Catalog identifier.
    pub item_id: String,
    /// Units ordered.
    pub quantity: u32,
}

/// Request body for `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer placing the order.
    pub customer_id: String,
    /// Lines to order.
    pub items: Vec<OrderLine>,
    /// Order total to charge.
    pub amount: Decimal,
}

/// A stored order record, also the response body for order endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Order identifier, `order-<uuid>`.
    pub order_id: String,
    /// Customer the order belongs to.
    pub customer_id: String,
    /// Ordered lines.
    pub items: Vec<OrderLine>,
    /// Charged total.
    pub amount: Decimal,
    /// Charge currency.
    pub currency: String,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Why the order failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Payment record backing a confirmed order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// When the order was accepted.
    pub created_at: DateTime<Utc>,
    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}
