//! Storage boundary
//!
//! The ledger and repository only see the [`Store`] trait: point lookups,
//! ordered listings and an all-or-nothing [`UnitOfWork`] commit. Two
//! implementations exist, an in-memory one for tests and local runs, and a
//! PostgreSQL one for deployments.

use anyhow::Context;
use async_trait::async_trait;
use shared::{Entity, EntityKind, Record};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A single mutation inside a [`UnitOfWork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Insert a new row; the store assigns the id
    Insert(Entity),
    /// Overwrite an existing row by id
    Update(Entity),
    /// Delete an existing row
    Remove { kind: EntityKind, id: i32 },
    /// `balance = balance + delta` on an existing stock, applied in place
    AdjustBalance { stock_id: i32, delta: i32 },
}

/// Ordered batch of changes committed as one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOfWork {
    changes: Vec<Change>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, entity: impl Into<Entity>) -> Self {
        self.changes.push(Change::Insert(entity.into()));
        self
    }

    pub fn update(mut self, entity: impl Into<Entity>) -> Self {
        self.changes.push(Change::Update(entity.into()));
        self
    }

    pub fn remove(mut self, kind: EntityKind, id: i32) -> Self {
        self.changes.push(Change::Remove { kind, id });
        self
    }

    pub fn adjust_balance(mut self, stock_id: i32, delta: i32) -> Self {
        self.changes.push(Change::AdjustBalance { stock_id, delta });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

/// Transactional entity store
///
/// `commit` either applies every change or none. An `Update`, `Remove` or
/// `AdjustBalance` that targets a missing row fails with
/// `AppError::EntityNotFound` and rolls the whole batch back.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create the schema if needed. Returns `true` when it did not exist before.
    async fn ensure_created(&self) -> AppResult<bool>;

    /// Cheap connectivity check
    async fn ping(&self) -> AppResult<()>;

    async fn find(&self, kind: EntityKind, id: i32) -> AppResult<Option<Entity>>;

    async fn count(&self, kind: EntityKind) -> AppResult<i64>;

    /// Rows of one kind ordered by id
    async fn list(&self, kind: EntityKind, offset: i64, limit: i64) -> AppResult<Vec<Entity>>;

    /// Apply a batch atomically; returns the ids assigned to inserts, in order
    async fn commit(&self, work: UnitOfWork) -> AppResult<Vec<i32>>;

    async fn insert(&self, entity: Entity) -> AppResult<i32> {
        let ids = self.commit(UnitOfWork::new().insert(entity)).await?;
        let id = ids.first().copied().context("insert returned no id")?;
        Ok(id)
    }

    async fn update(&self, entity: Entity) -> AppResult<()> {
        self.commit(UnitOfWork::new().update(entity)).await?;
        Ok(())
    }

    async fn remove(&self, kind: EntityKind, id: i32) -> AppResult<()> {
        self.commit(UnitOfWork::new().remove(kind, id)).await?;
        Ok(())
    }

    async fn exists(&self, kind: EntityKind, id: i32) -> AppResult<bool> {
        Ok(self.find(kind, id).await?.is_some())
    }
}

/// Typed lookup
pub async fn find_as<R: Record>(store: &dyn Store, id: i32) -> AppResult<Option<R>> {
    Ok(store.find(R::KIND, id).await?.and_then(R::from_entity))
}
