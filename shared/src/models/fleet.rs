//! Vehicles

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{plate_rule, rntrc_rule};

/// A truck, with up to three plates (tractor plus trailers)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vehicle {
    #[serde(default)]
    pub id: i32,
    pub plate1: String,
    pub plate2: Option<String>,
    pub plate3: Option<String>,
    /// ANTT carrier registration code
    pub rntrc: Option<String>,
    /// Empty weight, subtracted from every gross weighing
    pub tare: i32,
}

impl Vehicle {
    pub fn plates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.plate1.as_str())
            .chain(self.plate2.as_deref())
            .chain(self.plate3.as_deref())
    }
}

/// Input for registering a vehicle
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVehicle {
    #[validate(custom = "plate_rule")]
    pub plate1: String,
    #[validate(custom = "plate_rule")]
    pub plate2: Option<String>,
    #[validate(custom = "plate_rule")]
    pub plate3: Option<String>,
    #[validate(custom = "rntrc_rule")]
    pub rntrc: Option<String>,
    #[validate(range(min = 0))]
    pub tare: i32,
}

/// Blank optional plates are sent by forms; treat them as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NewVehicle {
    pub fn normalized(self) -> Self {
        Self {
            plate2: non_blank(self.plate2),
            plate3: non_blank(self.plate3),
            rntrc: non_blank(self.rntrc),
            ..self
        }
    }
}

impl From<NewVehicle> for Vehicle {
    fn from(input: NewVehicle) -> Self {
        let input = input.normalized();
        Self {
            id: 0,
            plate1: input.plate1,
            plate2: input.plate2,
            plate3: input.plate3,
            rntrc: input.rntrc,
            tare: input.tare,
        }
    }
}
