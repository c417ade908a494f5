// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Service identity.
//!
//! The stack is a closed set of three services. Using an enum rather than a
//! free-form string means a rollback request for an unknown service is
//! rejected at deserialization time, before any state is touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A deployable service in the NovaMart stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceName {
    /// Order orchestration service (port 8080).
    #[serde(rename = "order-service")]
    Order,
    /// Inventory service (port 8081).
    #[serde(rename = "inventory-service")]
    Inventory,
    /// Payment service (port 8082).
    #[serde(rename = "payment-service")]
    Payment,
}

impl ServiceName {
    /// All known services, in stack order.
    pub const ALL: [ServiceName; 3] = [
        ServiceName::Order,
        ServiceName::Inventory,
        ServiceName::Payment,
    ];

    /// The wire/compose name of this service (e.g. `order-service`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Order => "order-service",
            ServiceName::Inventory => "inventory-service",
            ServiceName::Payment => "payment-service",
        }
    }

    /// The env-file key holding this service's active version tag.
    ///
    /// Derived the same way the surrounding tooling derives it:
    /// `order-service` becomes `ORDER_SERVICE_VERSION`.
    pub fn version_key(&self) -> &'static str {
        match self {
            ServiceName::Order => "ORDER_SERVICE_VERSION",
            ServiceName::Inventory => "INVENTORY_SERVICE_VERSION",
            ServiceName::Payment => "PAYMENT_SERVICE_VERSION",
        }
    }

    /// The port this service listens on in the default compose topology.
    pub fn default_port(&self) -> u16 {
        match self {
            ServiceName::Order => 8080,
            ServiceName::Inventory => 8081,
            ServiceName::Payment => 8082,
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a service name outside the known set.
#[derive(Debug, Error)]
#[error("Unknown service name: {0}")]
pub struct UnknownService(pub String);

impl FromStr for ServiceName {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order-service" => Ok(ServiceName::Order),
            "inventory-service" => Ok(ServiceName::Inventory),
            "payment-service" => Ok(ServiceName::Payment),
            other => Err(UnknownService(other.to_string())),
        }
    }
}
