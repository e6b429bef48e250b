//! Entity repository: create / update / delete dispatch over every entity kind
//!
//! Movement creates are routed through the [`StockLedger`]; everything else
//! goes straight to the store.

use std::sync::Arc;

use serde::Serialize;
use shared::{Entity, EntityKind};

use crate::error::AppResult;
use crate::services::ledger::StockLedger;
use crate::services::sample;
use crate::store::Store;

/// Result of an update request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The stored row was overwritten
    Applied,
    /// The kind does not accept updates; nothing was persisted
    Ignored,
}

#[derive(Clone)]
pub struct EntityRepository {
    store: Arc<dyn Store>,
    ledger: StockLedger,
}

impl EntityRepository {
    pub fn new(store: Arc<dyn Store>, ledger: StockLedger) -> Self {
        Self { store, ledger }
    }

    /// Create an entity and return it with its assigned id
    pub async fn create(&self, entity: Entity) -> AppResult<Entity> {
        match entity.into_movement() {
            Ok(movement) => Ok(self.ledger.record_movement(movement).await?.into()),
            Err(mut entity) => {
                let id = self.store.insert(entity.clone()).await?;
                entity.set_id(id);
                tracing::info!(kind = %entity.kind(), id = id, "Created entity");
                Ok(entity)
            }
        }
    }

    /// Overwrite an existing master-data row
    ///
    /// Client, Driver, Product and Vehicle must already exist. Stock and the
    /// movement kinds are accepted and ignored.
    pub async fn update(&self, entity: Entity) -> AppResult<UpdateOutcome> {
        let (kind, id) = (entity.kind(), entity.id());
        match kind {
            EntityKind::Client | EntityKind::Driver | EntityKind::Product | EntityKind::Vehicle => {
                // Fails with EntityNotFound when the row is missing.
                self.store.update(entity).await?;
                tracing::info!(kind = %kind, id = id, "Updated entity");
                Ok(UpdateOutcome::Applied)
            }
            EntityKind::Stock
            | EntityKind::Incoming
            | EntityKind::Shipping
            | EntityKind::Enhancement => {
                tracing::warn!(kind = %kind, id = id, "Update ignored for this kind");
                Ok(UpdateOutcome::Ignored)
            }
        }
    }

    /// Remove a row of any kind
    ///
    /// Deleting a movement leaves stock balances as they are; use
    /// [`StockLedger::reverse_movement`] to undo its effect.
    pub async fn delete(&self, kind: EntityKind, id: i32) -> AppResult<()> {
        self.store.remove(kind, id).await?;
        tracing::info!(kind = %kind, id = id, "Deleted entity");
        Ok(())
    }

    /// Create the store if needed, seeding the sample dataset on first creation
    ///
    /// Returns whether this call created the store.
    pub async fn initialize(&self, seed_sample: bool) -> AppResult<bool> {
        let created = self.store.ensure_created().await?;
        if !created {
            tracing::debug!("Store already initialized");
            return Ok(false);
        }

        tracing::info!("Store created");
        if seed_sample {
            // The store already counts as created, so a later start will not
            // seed again. Rows committed before the failure stay in place.
            if let Err(err) = sample::seed(self.store.as_ref()).await {
                tracing::error!(
                    error = %err,
                    "Sample seeding failed; the store holds a partial sample and will not be reseeded"
                );
                return Err(err);
            }
        }
        Ok(true)
    }
}
