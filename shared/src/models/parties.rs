//! Clients and drivers

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::cnh_rule;

/// A client whose goods are held in the warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    pub address: String,
}

/// Input for registering a client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewClient {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
}

impl From<NewClient> for Client {
    fn from(input: NewClient) -> Self {
        Self {
            id: 0,
            name: input.name,
            address: input.address,
        }
    }
}

/// A truck driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Driver {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    /// Driver license number (CNH)
    pub cnh: String,
}

/// Input for registering a driver
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDriver {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom = "cnh_rule")]
    pub cnh: String,
}

impl From<NewDriver> for Driver {
    fn from(input: NewDriver) -> Self {
        Self {
            id: 0,
            name: input.name,
            cnh: input.cnh,
        }
    }
}
