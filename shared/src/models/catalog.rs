//! Products and the per-client stocks that hold them

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product kind stored in the warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub description: String,
}

impl From<NewProduct> for Product {
    fn from(input: NewProduct) -> Self {
        Self {
            id: 0,
            name: input.name,
            description: input.description,
        }
    }
}

/// Quantity of one product held for one client
///
/// `balance` is signed: shipments and transfers are not checked against the
/// current balance, so it may go negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stock {
    #[serde(default)]
    pub id: i32,
    pub client_id: i32,
    pub product_id: i32,
    pub balance: i32,
}

/// Input for opening a stock
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewStock {
    #[validate(range(min = 1))]
    pub client_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
    /// Opening balance
    #[serde(default)]
    pub balance: i32,
}

impl From<NewStock> for Stock {
    fn from(input: NewStock) -> Self {
        Self {
            id: 0,
            client_id: input.client_id,
            product_id: input.product_id,
            balance: input.balance,
        }
    }
}
