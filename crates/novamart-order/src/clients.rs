// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Typed clients for the downstream inventory and payment services.
//!
//! A downstream refusal (out of stock, payment declined) is a normal outcome
//! and comes back as a variant, not an error. [`ClientError`] is reserved for
//! transport failures and responses the order flow cannot interpret.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::OrderLine;

/// Errors talking to a downstream service.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The request never produced a usable response.
    #[error("request to {service} failed: {source}")]
    Transport {
        /// Downstream service name.
        service: &'static str,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The downstream answered with a status the flow does not handle.
    #[error("{service} returned unexpected status {status}")]
    UnexpectedStatus {
        /// Downstream service name.
        service: &'static str,
        /// HTTP status received.
        status: u16,
    },
}

/// Result of a stock reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// All lines reserved.
    Reserved,
    /// Refused; the listed items lacked stock. Nothing was deducted.
    Unavailable(Vec<String>),
}

/// Result of a charge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// Payment completed.
    Approved {
        /// Payment record id at the payment service.
        payment_id: String,
    },
    /// Payment declined by the gateway.
    Declined {
        /// Gateway-provided reason.
        reason: String,
    },
}

/// Client for the inventory service.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    base_url: String,
    client: reqwest::Client,
}

impl InventoryClient {
    /// Create a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Reserve stock for an order, all-or-nothing.
    pub async fn reserve(
        &self,
        order_id: &str,
        items: &[OrderLine],
    ) -> Result<ReserveOutcome, ClientError> {
        let url = format!("{}/api/inventory/reserve", self.base_url);
        debug!(order_id, url = %url, "Reserving inventory");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "order_id": order_id, "items": items }))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                service: "inventory",
                source,
            })?;

        match response.status().as_u16() {
            200 => Ok(ReserveOutcome::Reserved),
            404 | 409 => {
                let body: serde_json::Value =
                    response.json().await.map_err(|source| ClientError::Transport {
                        service: "inventory",
                        source,
                    })?;
                let unavailable = body["unavailable_items"]
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(ReserveOutcome::Unavailable(unavailable))
            }
            status => Err(ClientError::UnexpectedStatus {
                service: "inventory",
                status,
            }),
        }
    }

    /// Return reserved stock for an order that did not complete.
    pub async fn release(&self, order_id: &str, items: &[OrderLine]) -> Result<(), ClientError> {
        let url = format!("{}/api/inventory/release", self.base_url);
        debug!(order_id, url = %url, "Releasing reservation");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "order_id": order_id, "items": items }))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                service: "inventory",
                source,
            })?;

        match response.status().as_u16() {
            200 => Ok(()),
            status => Err(ClientError::UnexpectedStatus {
                service: "inventory",
                status,
            }),
        }
    }
}

/// Client for the payment service.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    base_url: String,
    client: reqwest::Client,
}

impl PaymentClient {
    /// Create a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Charge an order total against the payment gateway.
    pub async fn charge(
        &self,
        order_id: &str,
        customer_id: &str,
        amount: Decimal,
    ) -> Result<ChargeOutcome, ClientError> {
        let url = format!("{}/api/payments", self.base_url);
        debug!(order_id, url = %url, "Requesting payment");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "order_id": order_id,
                "customer_id": customer_id,
                "amount": amount,
                "currency": "USD",
                "payment_method": "credit_card",
                "idempotency_key": order_id,
            }))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                service: "payment",
                source,
            })?;

        let status = response.status().as_u16();
        let body: serde_json::Value =
            response.json().await.map_err(|source| ClientError::Transport {
                service: "payment",
                source,
            })?;

        match status {
            200 | 201 => Ok(ChargeOutcome::Approved {
                payment_id: body["payment_id"].as_str().unwrap_or_default().to_string(),
            }),
            402 => Ok(ChargeOutcome::Declined {
                reason: body["reason"]
                    .as_str()
                    .unwrap_or("Payment declined")
                    .to_string(),
            }),
            status => Err(ClientError::UnexpectedStatus {
                service: "payment",
                status,
            }),
        }
    }
}
