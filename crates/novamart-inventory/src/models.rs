// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog item with current stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Catalog identifier, e.g. `WIDGET-001`.
    pub item_id: String,
    /// Display name.
    pub name: String,
    /// Units currently in stock.
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
}

/// One line of a reservation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationLine {
    /// Catalog identifier to reserve.
    pub item_id: String,
    /// Units requested.
    pub quantity: u32,
}

/// Request body for `POST /api/inventory/reserve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    /// Order the reservation is for.
    pub order_id: String,
    /// Lines to reserve, all-or-nothing.
    pub items: Vec<ReservationLine>,
}

/// Response body for a successful reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveResponse {
    /// Always `true` on success.
    pub reserved: bool,
    /// Order the reservation was made for.
    pub order_id: String,
    /// Lines that were deducted from stock.
    pub items: Vec<ReservationLine>,
}

/// Request body for `POST /api/inventory/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Lines to check availability for.
    pub items: Vec<ReservationLine>,
}

/// Availability report for one requested line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckLineReport {
    /// Catalog identifier, echoed back.
    pub item_id: String,
    /// Units requested.
    pub requested: u32,
    /// Units currently in stock; zero for unknown items.
    pub in_stock: u32,
    /// Whether the requested units could be reserved right now.
    pub available: bool,
}

/// Response body for `POST /api/inventory/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// True only when every line is available.
    pub available: bool,
    /// Per-line reports.
    pub items: Vec<CheckLineReport>,
}

/// Response body for `GET /api/inventory/summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySummary {
    /// Distinct catalog items.
    pub total_skus: usize,
    /// Units in stock across the catalog.
    pub total_units: u64,
    /// Stock valued at unit price.
    pub total_value: Decimal,
    /// Current catalog snapshot.
    pub items: Vec<Item>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_item_serializes_price_as_number() {
        let item = Item {
            item_id: "WIDGET-001".to_string(),
            name: "Widget".to_string(),
            quantity: 1000,
            price: dec!(29.99),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["price"], serde_json::json!(29.99));
    }

    #[test]
    fn test_reserve_request_deserializes() {
        let request: ReserveRequest = serde_json::from_value(serde_json::json!({
            "order_id": "order-1",
            "items": [{ "item_id": "WIDGET-001", "quantity": 2 }],
        }))
        .unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
    }
}
