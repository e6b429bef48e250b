//! Paged listings and detail lookups for the web layer

use std::sync::Arc;

use serde::Serialize;
use shared::{Entity, EntityKind, PagingInfo};

use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Outcome of a page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    Page {
        items: Vec<EntityDetails>,
        paging: PagingInfo,
    },
    /// The requested page is out of range. `None` means the canonical,
    /// unnumbered first page.
    Redirect { page: Option<i64> },
}

/// An entity together with the records it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDetails {
    pub entity: Entity,
    pub related: Vec<Entity>,
}

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn Store>,
    items_per_page: i64,
}

impl ListingService {
    pub fn new(store: Arc<dyn Store>, items_per_page: i64) -> Self {
        Self {
            store,
            items_per_page,
        }
    }

    /// One page of `kind`, ordered by id, each row with its related records
    pub async fn list_page(
        &self,
        kind: EntityKind,
        requested_page: Option<&str>,
        items_per_page: Option<i64>,
    ) -> AppResult<PageOutcome> {
        let total_items = self.store.count(kind).await?;
        let paging = PagingInfo::create(
            total_items,
            items_per_page.unwrap_or(self.items_per_page),
            requested_page,
        );

        if paging.total_items > 0 {
            if paging.page < 1 {
                return Ok(PageOutcome::Redirect { page: None });
            }
            if paging.page > paging.total_pages {
                return Ok(PageOutcome::Redirect {
                    page: Some(paging.total_pages),
                });
            }
        }

        let rows = if paging.is_in_range() {
            self.store
                .list(kind, paging.offset(), paging.items_per_page)
                .await?
        } else {
            Vec::new()
        };

        let mut items = Vec::with_capacity(rows.len());
        for entity in rows {
            let related = self.resolve_related(&entity).await?;
            items.push(EntityDetails { entity, related });
        }

        Ok(PageOutcome::Page { items, paging })
    }

    pub async fn get_by_id(&self, kind: EntityKind, id: i32) -> AppResult<Entity> {
        self.store
            .find(kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(kind, id))
    }

    /// Entity plus its client, stock(s), the stocks' products, driver and vehicle
    pub async fn details(&self, kind: EntityKind, id: i32) -> AppResult<EntityDetails> {
        let entity = self.get_by_id(kind, id).await?;
        let related = self.resolve_related(&entity).await?;
        Ok(EntityDetails { entity, related })
    }

    /// Records `entity` points at, plus the product of every referenced stock
    ///
    /// References that no longer resolve are left out.
    async fn resolve_related(&self, entity: &Entity) -> AppResult<Vec<Entity>> {
        let mut pending = entity.references();
        let mut seen: Vec<(EntityKind, i32)> = Vec::new();
        let mut related = Vec::new();

        while let Some(key) = next_unseen(&mut pending, &seen) {
            seen.push(key);
            let Some(found) = self.store.find(key.0, key.1).await? else {
                tracing::debug!(kind = %key.0, id = key.1, "Referenced record missing");
                continue;
            };
            if let Entity::Stock(stock) = &found {
                pending.push((EntityKind::Product, stock.product_id));
            }
            related.push(found);
        }

        Ok(related)
    }
}

fn next_unseen(
    pending: &mut Vec<(EntityKind, i32)>,
    seen: &[(EntityKind, i32)],
) -> Option<(EntityKind, i32)> {
    while !pending.is_empty() {
        let key = pending.remove(0);
        if !seen.contains(&key) {
            return Some(key);
        }
    }
    None
}
