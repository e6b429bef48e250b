//! Stock ledger: the only path through which stock balances change
//!
//! Every movement is weighed (gross minus vehicle tare), checked against the
//! stocks it references, and committed together with its balance deltas as a
//! single unit of work.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{EntityKind, Movement, Record, Stock, Vehicle};

use crate::error::{AppError, AppResult};
use crate::store::{find_as, Store, UnitOfWork};

/// What to do when a movement names a vehicle that is not on record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVehiclePolicy {
    /// Weigh as if the tare were 0. The net weight then equals the gross weight.
    #[default]
    ZeroTare,
    /// Fail with `EntityNotFound`
    Reject,
}

/// Signed change to one stock balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceDelta {
    pub stock_id: i32,
    pub delta: i32,
}

/// Net weight of a weighing
pub fn net_weight(gross_weight: i32, tare: i32) -> AppResult<i32> {
    gross_weight.checked_sub(tare).ok_or_else(|| {
        AppError::ValidationError(format!(
            "net weight of gross {} minus tare {} is out of range",
            gross_weight, tare
        ))
    })
}

/// Balance changes a movement of `net` units causes
///
/// Incoming credits its stock, Shipping debits it, Enhancement moves `net`
/// from the base stock to the final stock.
pub fn balance_deltas(movement: &Movement, net: i32) -> AppResult<Vec<BalanceDelta>> {
    let debit = net
        .checked_neg()
        .ok_or_else(|| AppError::ValidationError(format!("net weight {} out of range", net)))?;

    let deltas = match movement {
        Movement::Incoming(m) => vec![BalanceDelta {
            stock_id: m.stock_id,
            delta: net,
        }],
        Movement::Shipping(m) => vec![BalanceDelta {
            stock_id: m.stock_id,
            delta: debit,
        }],
        Movement::Enhancement(m) => vec![
            BalanceDelta {
                stock_id: m.base_stock_id,
                delta: debit,
            },
            BalanceDelta {
                stock_id: m.final_stock_id,
                delta: net,
            },
        ],
    };
    Ok(deltas)
}

#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn Store>,
    missing_vehicle: MissingVehiclePolicy,
}

impl StockLedger {
    pub fn new(store: Arc<dyn Store>, missing_vehicle: MissingVehiclePolicy) -> Self {
        Self {
            store,
            missing_vehicle,
        }
    }

    pub fn missing_vehicle_policy(&self) -> MissingVehiclePolicy {
        self.missing_vehicle
    }

    async fn vehicle_tare(&self, vehicle_id: i32) -> AppResult<i32> {
        match find_as::<Vehicle>(self.store.as_ref(), vehicle_id).await? {
            Some(vehicle) => Ok(vehicle.tare),
            None => match self.missing_vehicle {
                MissingVehiclePolicy::ZeroTare => {
                    tracing::warn!(
                        vehicle_id = vehicle_id,
                        "Vehicle not found, weighing with zero tare"
                    );
                    Ok(0)
                }
                MissingVehiclePolicy::Reject => {
                    Err(AppError::not_found(EntityKind::Vehicle, vehicle_id))
                }
            },
        }
    }

    /// Record a movement and apply its balance deltas atomically
    ///
    /// Caller-supplied `net_weight`, `vehicle_tare` and `created_at` are
    /// replaced. Returns the movement as persisted, with its assigned id.
    pub async fn record_movement(&self, mut movement: Movement) -> AppResult<Movement> {
        let tare = self.vehicle_tare(movement.vehicle_id()).await?;
        let net = net_weight(movement.gross_weight(), tare)?;

        // All references resolve before anything is written.
        for stock_id in movement.stock_ids() {
            if !self.store.exists(EntityKind::Stock, stock_id).await? {
                return Err(AppError::not_found(EntityKind::Stock, stock_id));
            }
        }

        let deltas = balance_deltas(&movement, net)?;
        movement.stamp(tare, net, Utc::now());

        let work = deltas.iter().fold(
            UnitOfWork::new().insert(movement.clone()),
            |work, d| work.adjust_balance(d.stock_id, d.delta),
        );
        let ids = self.store.commit(work).await?;
        let id = ids
            .first()
            .copied()
            .context("movement insert returned no id")?;
        movement.set_id(id);

        tracing::info!(
            kind = %movement.kind(),
            movement_id = id,
            gross_weight = movement.gross_weight(),
            tare = tare,
            net_weight = net,
            "Recorded movement"
        );
        for d in &deltas {
            tracing::debug!(stock_id = d.stock_id, delta = d.delta, "Adjusted stock balance");
        }

        Ok(movement)
    }

    /// Undo a recorded movement: apply the inverse deltas and delete it, atomically
    ///
    /// Uses the net weight stored on the movement, so a later change of the
    /// vehicle tare does not skew the reversal.
    pub async fn reverse_movement(&self, kind: EntityKind, id: i32) -> AppResult<Movement> {
        if !kind.is_movement() {
            return Err(AppError::ValidationError(format!(
                "{} is not a movement kind",
                kind
            )));
        }

        let movement = self
            .store
            .find(kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(kind, id))?
            .into_movement()
            .map_err(|_| AppError::Internal(format!("{} {} is not a movement", kind, id)))?;

        let deltas = balance_deltas(&movement, movement.net_weight())?;
        let mut work = UnitOfWork::new().remove(kind, id);
        for d in &deltas {
            let inverse = d.delta.checked_neg().ok_or_else(|| {
                AppError::ValidationError(format!("delta {} out of range", d.delta))
            })?;
            work = work.adjust_balance(d.stock_id, inverse);
        }
        self.store.commit(work).await?;

        tracing::info!(
            kind = %kind,
            movement_id = id,
            net_weight = movement.net_weight(),
            "Reversed movement"
        );

        Ok(movement)
    }

    /// Current balance of one stock
    pub async fn balance(&self, stock_id: i32) -> AppResult<i32> {
        find_as::<Stock>(self.store.as_ref(), stock_id)
            .await?
            .map(|s| s.balance)
            .ok_or_else(|| AppError::not_found(EntityKind::Stock, stock_id))
    }

    /// Every stock with its current balance, ordered by id
    pub async fn balances(&self) -> AppResult<Vec<Stock>> {
        let total = self.store.count(EntityKind::Stock).await?;
        let rows = self.store.list(EntityKind::Stock, 0, total).await?;
        Ok(rows.into_iter().filter_map(Stock::from_entity).collect())
    }
}
