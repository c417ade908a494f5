// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory payment storage.
//!
//! Intentionally non-persistent: payments vanish on restart, which is fine
//! for the workshop topology. The outcome for a replayed order id is
//! recomputed identically by the simulator, so no decision state is lost.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{PaymentResponse, PaymentStatus};

/// Shared in-memory payment store.
#[derive(Debug, Clone, Default)]
pub struct PaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, PaymentResponse>>>,
}

impl PaymentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payment record.
    pub async fn insert(&self, payment: PaymentResponse) {
        let mut payments = self.payments.write().await;
        payments.insert(payment.payment_id, payment);
    }

    /// Look up a payment by id.
    pub async fn get(&self, payment_id: Uuid) -> Option<PaymentResponse> {
        let payments = self.payments.read().await;
        payments.get(&payment_id).cloned()
    }

    /// Find a completed payment for an order, if one exists.
    pub async fn completed_for_order(&self, order_id: &str) -> Option<PaymentResponse> {
        let payments = self.payments.read().await;
        payments
            .values()
            .find(|p| p.order_id == order_id && p.status == PaymentStatus::Completed)
            .cloned()
    }

    /// Number of stored payments.
    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn payment(order_id: &str, status: PaymentStatus) -> PaymentResponse {
        PaymentResponse {
            payment_id: Uuid::new_v4(),
            order_id: order_id.to_string(),
            amount: Decimal::new(2999, 2),
            currency: "USD".to_string(),
            status,
            payment_method: PaymentMethod::CreditCard,
            transaction_id: None,
            failure_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = PaymentStore::new();
        let p = payment("o-1", PaymentStatus::Completed);
        let id = p.payment_id;
        store.insert(p).await;

        assert!(store.get(id).await.is_some());
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_completed_for_order_skips_failed() {
        let store = PaymentStore::new();
        store.insert(payment("o-1", PaymentStatus::Failed)).await;
        assert!(store.completed_for_order("o-1").await.is_none());

        store.insert(payment("o-1", PaymentStatus::Completed)).await;
        let found = store.completed_for_order("o-1").await.unwrap();
        assert_eq!(found.status, PaymentStatus::Completed);
    }
}
