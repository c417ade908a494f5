// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Payment request/response wire models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// PayPal.
    Paypal,
    /// Bank transfer.
    BankTransfer,
}

/// Payment processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Accepted but not yet processed.
    Pending,
    /// Gateway interaction in flight.
    Processing,
    /// Approved and settled.
    Completed,
    /// Declined by the gateway.
    Failed,
    /// Refunded after completion.
    Refunded,
}

/// Request to process a payment. Amounts arrive as JSON numbers (the order
/// service sends plain doubles) and are kept as `Decimal` in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    /// Order id from the order service. Opaque; used as the hash input for
    /// the outcome decision.
    pub order_id: String,
    /// Payment amount.
    pub amount: Decimal,
    /// Currency code, defaulting to USD.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Customer identifier.
    pub customer_id: String,
    /// Client-provided idempotency key; when present, a completed payment
    /// for the same order is returned instead of charging again.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// A processed payment, as stored and as returned on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Unique payment identifier.
    pub payment_id: Uuid,
    /// Associated order id.
    pub order_id: String,
    /// Payment amount.
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Current status.
    pub status: PaymentStatus,
    /// Payment method used.
    pub payment_method: PaymentMethod,
    /// Gateway transaction reference (present when completed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Reason for decline (present when failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: PaymentRequest = serde_json::from_str(
            r#"{
                "order_id": "o-1",
                "amount": 42.50,
                "payment_method": "credit_card",
                "customer_id": "c-1"
            }"#,
        )
        .unwrap();
        assert_eq!(request.currency, "USD");
        assert!(request.idempotency_key.is_none());
        assert_eq!(request.payment_method, PaymentMethod::CreditCard);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
    }
}
