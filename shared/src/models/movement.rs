//! Goods movements: incoming deliveries, shipments and stock-to-stock transfers
//!
//! Net weight on every movement is derived from the gross weighing and the
//! vehicle tare when the movement is recorded; whatever a caller puts in
//! `net_weight` is overwritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Processing status of an incoming delivery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpStatus {
    #[default]
    Pending,
    Completed,
    Canceled,
}

impl OpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpStatus::Pending => "pending",
            OpStatus::Completed => "completed",
            OpStatus::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OpStatus::Pending),
            "completed" => Some(OpStatus::Completed),
            "canceled" => Some(OpStatus::Canceled),
            _ => None,
        }
    }
}

/// Goods delivered by a client into one of its stocks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incoming {
    #[serde(default)]
    pub id: i32,
    /// Origin client
    pub client_id: i32,
    /// Destination stock
    pub stock_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub gross_weight: i32,
    /// Copy of the vehicle tare at weighing time
    #[serde(default)]
    pub vehicle_tare: i32,
    #[serde(default)]
    pub net_weight: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: OpStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewIncoming {
    #[validate(range(min = 1))]
    pub client_id: i32,
    #[validate(range(min = 1))]
    pub stock_id: i32,
    #[validate(range(min = 1))]
    pub vehicle_id: i32,
    #[validate(range(min = 1))]
    pub driver_id: i32,
    #[validate(range(min = 0))]
    pub gross_weight: i32,
    #[serde(default)]
    pub status: OpStatus,
}

impl From<NewIncoming> for Incoming {
    fn from(input: NewIncoming) -> Self {
        Self {
            id: 0,
            client_id: input.client_id,
            stock_id: input.stock_id,
            vehicle_id: input.vehicle_id,
            driver_id: input.driver_id,
            gross_weight: input.gross_weight,
            vehicle_tare: 0,
            net_weight: 0,
            created_at: Utc::now(),
            status: input.status,
        }
    }
}

/// Goods shipped out of a stock to a destination client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shipping {
    #[serde(default)]
    pub id: i32,
    /// Destination client
    pub client_id: i32,
    pub stock_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub gross_weight: i32,
    #[serde(default)]
    pub net_weight: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewShipping {
    #[validate(range(min = 1))]
    pub client_id: i32,
    #[validate(range(min = 1))]
    pub stock_id: i32,
    #[validate(range(min = 1))]
    pub vehicle_id: i32,
    #[validate(range(min = 1))]
    pub driver_id: i32,
    #[validate(range(min = 0))]
    pub gross_weight: i32,
}

impl From<NewShipping> for Shipping {
    fn from(input: NewShipping) -> Self {
        Self {
            id: 0,
            client_id: input.client_id,
            stock_id: input.stock_id,
            vehicle_id: input.vehicle_id,
            driver_id: input.driver_id,
            gross_weight: input.gross_weight,
            net_weight: 0,
            created_at: Utc::now(),
        }
    }
}

/// Transfer of balance from a base stock to a final stock via a vehicle trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enhancement {
    #[serde(default)]
    pub id: i32,
    pub base_stock_id: i32,
    pub final_stock_id: i32,
    pub vehicle_id: i32,
    pub gross_weight: i32,
    #[serde(default)]
    pub net_weight: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewEnhancement {
    #[validate(range(min = 1))]
    pub base_stock_id: i32,
    #[validate(range(min = 1))]
    pub final_stock_id: i32,
    #[validate(range(min = 1))]
    pub vehicle_id: i32,
    #[validate(range(min = 0))]
    pub gross_weight: i32,
}

impl From<NewEnhancement> for Enhancement {
    fn from(input: NewEnhancement) -> Self {
        Self {
            id: 0,
            base_stock_id: input.base_stock_id,
            final_stock_id: input.final_stock_id,
            vehicle_id: input.vehicle_id,
            gross_weight: input.gross_weight,
            net_weight: 0,
            created_at: Utc::now(),
        }
    }
}

/// The three movement kinds, as one value the ledger can match on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Movement {
    Incoming(Incoming),
    Shipping(Shipping),
    Enhancement(Enhancement),
}

impl Movement {
    pub fn id(&self) -> i32 {
        match self {
            Movement::Incoming(m) => m.id,
            Movement::Shipping(m) => m.id,
            Movement::Enhancement(m) => m.id,
        }
    }

    pub fn set_id(&mut self, id: i32) {
        match self {
            Movement::Incoming(m) => m.id = id,
            Movement::Shipping(m) => m.id = id,
            Movement::Enhancement(m) => m.id = id,
        }
    }

    pub fn vehicle_id(&self) -> i32 {
        match self {
            Movement::Incoming(m) => m.vehicle_id,
            Movement::Shipping(m) => m.vehicle_id,
            Movement::Enhancement(m) => m.vehicle_id,
        }
    }

    pub fn gross_weight(&self) -> i32 {
        match self {
            Movement::Incoming(m) => m.gross_weight,
            Movement::Shipping(m) => m.gross_weight,
            Movement::Enhancement(m) => m.gross_weight,
        }
    }

    pub fn net_weight(&self) -> i32 {
        match self {
            Movement::Incoming(m) => m.net_weight,
            Movement::Shipping(m) => m.net_weight,
            Movement::Enhancement(m) => m.net_weight,
        }
    }

    /// Ids of every stock this movement touches
    pub fn stock_ids(&self) -> Vec<i32> {
        match self {
            Movement::Incoming(m) => vec![m.stock_id],
            Movement::Shipping(m) => vec![m.stock_id],
            Movement::Enhancement(m) => vec![m.base_stock_id, m.final_stock_id],
        }
    }

    /// Stamp the weighing result and creation time
    pub fn stamp(&mut self, tare: i32, net_weight: i32, now: DateTime<Utc>) {
        match self {
            Movement::Incoming(m) => {
                m.vehicle_tare = tare;
                m.net_weight = net_weight;
                m.created_at = now;
            }
            Movement::Shipping(m) => {
                m.net_weight = net_weight;
                m.created_at = now;
            }
            Movement::Enhancement(m) => {
                m.net_weight = net_weight;
                m.created_at = now;
            }
        }
    }
}
