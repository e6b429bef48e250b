use std::collections::BTreeMap;

use async_trait::async_trait;
use shared::{Entity, EntityKind};
use tokio::sync::RwLock;

use super::{Change, Store, UnitOfWork};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    created: bool,
    rows: BTreeMap<EntityKind, BTreeMap<i32, Entity>>,
    last_ids: BTreeMap<EntityKind, i32>,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> Option<&BTreeMap<i32, Entity>> {
        self.rows.get(&kind)
    }

    fn apply(&mut self, change: Change, assigned: &mut Vec<i32>) -> AppResult<()> {
        match change {
            Change::Insert(mut entity) => {
                let kind = entity.kind();
                let last = self.last_ids.entry(kind).or_insert(0);
                *last += 1;
                let id = *last;
                entity.set_id(id);
                self.rows.entry(kind).or_default().insert(id, entity);
                assigned.push(id);
            }
            Change::Update(entity) => {
                let (kind, id) = (entity.kind(), entity.id());
                let row = self
                    .rows
                    .get_mut(&kind)
                    .and_then(|t| t.get_mut(&id))
                    .ok_or_else(|| AppError::not_found(kind, id))?;
                *row = entity;
            }
            Change::Remove { kind, id } => {
                self.rows
                    .get_mut(&kind)
                    .and_then(|t| t.remove(&id))
                    .ok_or_else(|| AppError::not_found(kind, id))?;
            }
            Change::AdjustBalance { stock_id, delta } => {
                match self
                    .rows
                    .get_mut(&EntityKind::Stock)
                    .and_then(|t| t.get_mut(&stock_id))
                {
                    Some(Entity::Stock(stock)) => {
                        stock.balance = stock.balance.checked_add(delta).ok_or_else(|| {
                            AppError::ValidationError(format!(
                                "balance of stock {} would overflow",
                                stock_id
                            ))
                        })?;
                    }
                    _ => return Err(AppError::not_found(EntityKind::Stock, stock_id)),
                }
            }
        }
        Ok(())
    }
}

/// In-memory store.
///
/// Commits stage every change on a copy of the tables and swap it in only
/// when the whole batch succeeded. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ensure_created(&self) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let was_created = tables.created;
        tables.created = true;
        Ok(!was_created)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn find(&self, kind: EntityKind, id: i32) -> AppResult<Option<Entity>> {
        let tables = self.tables.read().await;
        Ok(tables.table(kind).and_then(|t| t.get(&id)).cloned())
    }

    async fn count(&self, kind: EntityKind) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.table(kind).map(|t| t.len() as i64).unwrap_or(0))
    }

    async fn list(&self, kind: EntityKind, offset: i64, limit: i64) -> AppResult<Vec<Entity>> {
        let tables = self.tables.read().await;
        let rows = match tables.table(kind) {
            Some(t) => t
                .values()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(rows)
    }

    async fn commit(&self, work: UnitOfWork) -> AppResult<Vec<i32>> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let mut assigned = Vec::new();

        for change in work.into_changes() {
            staged.apply(change, &mut assigned)?;
        }

        *tables = staged;
        Ok(assigned)
    }
}
