// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Catalog state and all-or-nothing reservation.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::{CheckLineReport, CheckResponse, InventorySummary, Item, ReservationLine};

/// Shared, lock-guarded catalog.
///
/// A `BTreeMap` keeps listings in a stable order so the summary endpoint is
/// deterministic.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    inner: Arc<Mutex<BTreeMap<String, Item>>>,
}

/// Why a reservation was refused.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReserveError {
    /// A requested item is not in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// One or more lines exceed current stock. No quantity was deducted.
    #[error("insufficient stock for: {}", .0.join(", "))]
    InsufficientStock(Vec<String>),
}

impl InventoryStore {
    /// Create a store pre-loaded with the seed catalog.
    pub fn seeded() -> Self {
        let mut catalog = BTreeMap::new();
        for item in seed_catalog() {
            catalog.insert(item.item_id.clone(), item);
        }
        Self {
            inner: Arc::new(Mutex::new(catalog)),
        }
    }

    /// Snapshot every catalog item.
    pub async fn list(&self) -> Vec<Item> {
        self.inner.lock().await.values().cloned().collect()
    }

    /// Look up a single item by id.
    pub async fn get(&self, item_id: &str) -> Option<Item> {
        self.inner.lock().await.get(item_id).cloned()
    }

    /// Report availability of each requested line without reserving.
    ///
    /// Unknown items report as not in stock rather than erroring; a caller
    /// probing a typo gets a clean "unavailable" answer.
    pub async fn check(&self, lines: &[ReservationLine]) -> CheckResponse {
        let catalog = self.inner.lock().await;
        let items: Vec<CheckLineReport> = lines
            .iter()
            .map(|line| {
                let in_stock = catalog.get(&line.item_id).map_or(0, |item| item.quantity);
                CheckLineReport {
                    item_id: line.item_id.clone(),
                    requested: line.quantity,
                    in_stock,
                    available: in_stock >= line.quantity,
                }
            })
            .collect();
        CheckResponse {
            available: items.iter().all(|report| report.available),
            items,
        }
    }

    /// Aggregate totals plus the current catalog snapshot.
    pub async fn summary(&self) -> InventorySummary {
        let catalog = self.inner.lock().await;
        let items: Vec<Item> = catalog.values().cloned().collect();
        InventorySummary {
            total_skus: items.len(),
            total_units: items.iter().map(|item| u64::from(item.quantity)).sum(),
            total_value: items
                .iter()
                .map(|item| item.price * rust_decimal::Decimal::from(item.quantity))
                .sum(),
            items,
        }
    }

    /// Reserve stock for every line or none of them.
    ///
    /// Verification and deduction happen under one lock acquisition, so a
    /// concurrent reservation can never observe a partially applied one.
    pub async fn reserve(
        &self,
        order_id: &str,
        lines: &[ReservationLine],
    ) -> Result<(), ReserveError> {
        let mut catalog = self.inner.lock().await;

        let mut short: Vec<String> = Vec::new();
        for line in lines {
            let item = catalog
                .get(&line.item_id)
                .ok_or_else(|| ReserveError::UnknownItem(line.item_id.clone()))?;
            if item.quantity < line.quantity {
                short.push(line.item_id.clone());
            }
        }
        if !short.is_empty() {
            warn!(order_id, short = ?short, "Reservation refused, insufficient stock");
            return Err(ReserveError::InsufficientStock(short));
        }

        for line in lines {
            if let Some(item) = catalog.get_mut(&line.item_id) {
                item.quantity -= line.quantity;
            }
        }
        info!(order_id, lines = lines.len(), "Stock reserved");
        Ok(())
    }

    /// Return previously reserved stock to the catalog.
    ///
    /// Compensates a reservation whose order later failed. Lines naming an
    /// unknown item are skipped with a warning rather than erroring, so a
    /// release can never fail an already-failed order a second time.
    pub async fn release(&self, order_id: &str, lines: &[ReservationLine]) {
        let mut catalog = self.inner.lock().await;
        for line in lines {
            match catalog.get_mut(&line.item_id) {
                Some(item) => item.quantity += line.quantity,
                None => warn!(order_id, item_id = %line.item_id, "Release for unknown item skipped"),
            }
        }
        info!(order_id, lines = lines.len(), "Reserved stock released");
    }

    /// Restore the seed catalog, discarding all reservations.
    pub async fn reset(&self) {
        let mut catalog = self.inner.lock().await;
        catalog.clear();
        for item in seed_catalog() {
            catalog.insert(item.item_id.clone(), item);
        }
        info!("Catalog reset to seed state");
    }
}

fn seed_catalog() -> Vec<Item> {
    vec![
        Item {
            item_id: "WIDGET-001".to_string(),
            name: "Standard Widget".to_string(),
            quantity: 1000,
            price: dec!(29.99),
        },
        Item {
            item_id: "WIDGET-002".to_string(),
            name: "Premium Widget".to_string(),
            quantity: 500,
            price: dec!(49.99),
        },
        Item {
            item_id: "GADGET-042".to_string(),
            name: "Deluxe Gadget".to_string(),
            quantity: 250,
            price: dec!(82.52),
        },
    ]
}
