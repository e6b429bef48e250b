//! The closed set of persisted entity kinds

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use super::{
    Client, Driver, Enhancement, Incoming, Movement, NewClient, NewDriver, NewEnhancement,
    NewIncoming, NewProduct, NewShipping, NewStock, NewVehicle, Product, Shipping, Stock, Vehicle,
};

/// Entity kinds, named as they appear in URL paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "clients")]
    Client,
    #[serde(rename = "products")]
    Product,
    #[serde(rename = "drivers")]
    Driver,
    #[serde(rename = "vehicles")]
    Vehicle,
    #[serde(rename = "stocks")]
    Stock,
    #[serde(rename = "incomings")]
    Incoming,
    #[serde(rename = "shippings")]
    Shipping,
    #[serde(rename = "enhancements")]
    Enhancement,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Client,
        EntityKind::Product,
        EntityKind::Driver,
        EntityKind::Vehicle,
        EntityKind::Stock,
        EntityKind::Incoming,
        EntityKind::Shipping,
        EntityKind::Enhancement,
    ];

    /// Table name in the relational store
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Product => "product",
            EntityKind::Driver => "driver",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Stock => "stock",
            EntityKind::Incoming => "incoming",
            EntityKind::Shipping => "shipping",
            EntityKind::Enhancement => "enhancement",
        }
    }

    /// Path segment used by the web layer
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Product => "products",
            EntityKind::Driver => "drivers",
            EntityKind::Vehicle => "vehicles",
            EntityKind::Stock => "stocks",
            EntityKind::Incoming => "incomings",
            EntityKind::Shipping => "shippings",
            EntityKind::Enhancement => "enhancements",
        }
    }

    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            EntityKind::Incoming | EntityKind::Shipping | EntityKind::Enhancement
        )
    }

    /// Decode and validate a create payload for this kind
    pub fn parse_payload(&self, payload: serde_json::Value) -> Result<Entity, PayloadError> {
        fn checked<T: Validate>(input: T) -> Result<T, PayloadError> {
            input.validate()?;
            Ok(input)
        }

        let entity = match self {
            EntityKind::Client => {
                Entity::Client(checked(serde_json::from_value::<NewClient>(payload)?)?.into())
            }
            EntityKind::Product => {
                Entity::Product(checked(serde_json::from_value::<NewProduct>(payload)?)?.into())
            }
            EntityKind::Driver => {
                Entity::Driver(checked(serde_json::from_value::<NewDriver>(payload)?)?.into())
            }
            EntityKind::Vehicle => {
                let input = serde_json::from_value::<NewVehicle>(payload)?.normalized();
                Entity::Vehicle(checked(input)?.into())
            }
            EntityKind::Stock => {
                Entity::Stock(checked(serde_json::from_value::<NewStock>(payload)?)?.into())
            }
            EntityKind::Incoming => {
                Entity::Incoming(checked(serde_json::from_value::<NewIncoming>(payload)?)?.into())
            }
            EntityKind::Shipping => {
                Entity::Shipping(checked(serde_json::from_value::<NewShipping>(payload)?)?.into())
            }
            EntityKind::Enhancement => Entity::Enhancement(
                checked(serde_json::from_value::<NewEnhancement>(payload)?)?.into(),
            ),
        };

        Ok(entity)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Client => write!(f, "Client"),
            EntityKind::Product => write!(f, "Product"),
            EntityKind::Driver => write!(f, "Driver"),
            EntityKind::Vehicle => write!(f, "Vehicle"),
            EntityKind::Stock => write!(f, "Stock"),
            EntityKind::Incoming => write!(f, "Incoming"),
            EntityKind::Shipping => write!(f, "Shipping"),
            EntityKind::Enhancement => write!(f, "Enhancement"),
        }
    }
}

/// Errors decoding a create payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Any persisted record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Entity {
    Client(Client),
    Product(Product),
    Driver(Driver),
    Vehicle(Vehicle),
    Stock(Stock),
    Incoming(Incoming),
    Shipping(Shipping),
    Enhancement(Enhancement),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Client(_) => EntityKind::Client,
            Entity::Product(_) => EntityKind::Product,
            Entity::Driver(_) => EntityKind::Driver,
            Entity::Vehicle(_) => EntityKind::Vehicle,
            Entity::Stock(_) => EntityKind::Stock,
            Entity::Incoming(_) => EntityKind::Incoming,
            Entity::Shipping(_) => EntityKind::Shipping,
            Entity::Enhancement(_) => EntityKind::Enhancement,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Entity::Client(e) => e.id,
            Entity::Product(e) => e.id,
            Entity::Driver(e) => e.id,
            Entity::Vehicle(e) => e.id,
            Entity::Stock(e) => e.id,
            Entity::Incoming(e) => e.id,
            Entity::Shipping(e) => e.id,
            Entity::Enhancement(e) => e.id,
        }
    }

    pub fn set_id(&mut self, id: i32) {
        match self {
            Entity::Client(e) => e.id = id,
            Entity::Product(e) => e.id = id,
            Entity::Driver(e) => e.id = id,
            Entity::Vehicle(e) => e.id = id,
            Entity::Stock(e) => e.id = id,
            Entity::Incoming(e) => e.id = id,
            Entity::Shipping(e) => e.id = id,
            Entity::Enhancement(e) => e.id = id,
        }
    }

    /// Records this one points at, in display order
    pub fn references(&self) -> Vec<(EntityKind, i32)> {
        match self {
            Entity::Client(_) | Entity::Product(_) | Entity::Driver(_) | Entity::Vehicle(_) => {
                Vec::new()
            }
            Entity::Stock(s) => vec![
                (EntityKind::Client, s.client_id),
                (EntityKind::Product, s.product_id),
            ],
            Entity::Incoming(m) => vec![
                (EntityKind::Client, m.client_id),
                (EntityKind::Stock, m.stock_id),
                (EntityKind::Driver, m.driver_id),
                (EntityKind::Vehicle, m.vehicle_id),
            ],
            Entity::Shipping(m) => vec![
                (EntityKind::Client, m.client_id),
                (EntityKind::Stock, m.stock_id),
                (EntityKind::Driver, m.driver_id),
                (EntityKind::Vehicle, m.vehicle_id),
            ],
            Entity::Enhancement(m) => vec![
                (EntityKind::Stock, m.base_stock_id),
                (EntityKind::Stock, m.final_stock_id),
                (EntityKind::Vehicle, m.vehicle_id),
            ],
        }
    }

    /// Split off the movement kinds; master data comes back unchanged in `Err`
    pub fn into_movement(self) -> Result<Movement, Entity> {
        match self {
            Entity::Incoming(m) => Ok(Movement::Incoming(m)),
            Entity::Shipping(m) => Ok(Movement::Shipping(m)),
            Entity::Enhancement(m) => Ok(Movement::Enhancement(m)),
            other => Err(other),
        }
    }
}

impl Movement {
    pub fn kind(&self) -> EntityKind {
        match self {
            Movement::Incoming(_) => EntityKind::Incoming,
            Movement::Shipping(_) => EntityKind::Shipping,
            Movement::Enhancement(_) => EntityKind::Enhancement,
        }
    }
}

impl From<Movement> for Entity {
    fn from(movement: Movement) -> Self {
        match movement {
            Movement::Incoming(m) => Entity::Incoming(m),
            Movement::Shipping(m) => Entity::Shipping(m),
            Movement::Enhancement(m) => Entity::Enhancement(m),
        }
    }
}

/// Typed access to one arm of [`Entity`]
pub trait Record: Sized {
    const KIND: EntityKind;

    fn into_entity(self) -> Entity;

    fn from_entity(entity: Entity) -> Option<Self>;
}

macro_rules! impl_record {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Record for $ty {
                const KIND: EntityKind = EntityKind::$ty;

                fn into_entity(self) -> Entity {
                    Entity::$ty(self)
                }

                fn from_entity(entity: Entity) -> Option<Self> {
                    match entity {
                        Entity::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Entity::$ty(value)
                }
            }
        )*
    };
}

impl_record!(Client, Product, Driver, Vehicle, Stock, Incoming, Shipping, Enhancement);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_through_path() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = serde_json::from_value(json!(kind.path())).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(serde_json::from_value::<EntityKind>(json!("users")).is_err());
    }

    #[test]
    fn test_movement_kinds() {
        let movements: Vec<_> = EntityKind::ALL.iter().filter(|k| k.is_movement()).collect();
        assert_eq!(movements.len(), 3);
    }

    #[test]
    fn test_parse_vehicle_payload_drops_blank_plates() {
        let entity = EntityKind::Vehicle
            .parse_payload(json!({
                "plate1": "AB1C23",
                "plate2": "",
                "plate3": "  ",
                "rntrc": "01234567",
                "tare": 13200
            }))
            .unwrap();

        match entity {
            Entity::Vehicle(v) => {
                assert_eq!(v.plate2, None);
                assert_eq!(v.plate3, None);
                assert_eq!(v.tare, 13200);
                assert_eq!(v.plates().count(), 1);
            }
            other => panic!("unexpected entity {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_rejects_negative_tare() {
        let result = EntityKind::Vehicle.parse_payload(json!({
            "plate1": "AB1C23",
            "tare": -5
        }));
        assert!(matches!(result, Err(PayloadError::Invalid(_))));
    }

    #[test]
    fn test_parse_payload_rejects_missing_field() {
        let result = EntityKind::Client.parse_payload(json!({ "name": "Client 1" }));
        assert!(matches!(result, Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_parse_incoming_ignores_caller_net_weight() {
        let entity = EntityKind::Incoming
            .parse_payload(json!({
                "client_id": 1,
                "stock_id": 1,
                "vehicle_id": 1,
                "driver_id": 1,
                "gross_weight": 14000,
                "net_weight": 99999
            }))
            .unwrap();

        match entity {
            Entity::Incoming(m) => assert_eq!(m.net_weight, 0),
            other => panic!("unexpected entity {:?}", other),
        }
    }

    #[test]
    fn test_references_of_enhancement() {
        let entity = Entity::Enhancement(Enhancement {
            id: 1,
            base_stock_id: 2,
            final_stock_id: 3,
            vehicle_id: 4,
            gross_weight: 0,
            net_weight: 0,
            created_at: chrono::Utc::now(),
        });
        assert_eq!(
            entity.references(),
            vec![
                (EntityKind::Stock, 2),
                (EntityKind::Stock, 3),
                (EntityKind::Vehicle, 4)
            ]
        );
    }

    #[test]
    fn test_record_conversion() {
        let client = Client {
            id: 7,
            name: "Client 1".into(),
            address: "Client Address 1".into(),
        };
        let entity = client.clone().into_entity();
        assert_eq!(entity.kind(), Client::KIND);
        assert_eq!(Client::from_entity(entity), Some(client));
    }
}
