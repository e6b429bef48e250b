//! PostgreSQL-backed store
//!
//! Every [`UnitOfWork`] runs inside one transaction. Balance adjustments are
//! issued as `balance = balance + $1` so concurrent movements against the same
//! stock serialize on the row lock instead of overwriting each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    Client, Driver, Enhancement, Entity, EntityKind, Incoming, OpStatus, Product, Shipping, Stock,
    Vehicle,
};
use sqlx::{postgres::PgRow, PgConnection, PgPool, Row};

use super::{Change, Store, UnitOfWork};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// SQLSTATE `numeric_value_out_of_range`
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// A balance increment that leaves the `integer` range is a rejected movement,
/// not a storage failure
fn balance_error(err: sqlx::Error, stock_id: i32) -> AppError {
    let out_of_range = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == NUMERIC_OUT_OF_RANGE);
    if out_of_range {
        AppError::ValidationError(format!("balance of stock {} would overflow", stock_id))
    } else {
        AppError::DatabaseError(err)
    }
}

fn columns(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Client => "id, name, address",
        EntityKind::Product => "id, name, description",
        EntityKind::Driver => "id, name, cnh",
        EntityKind::Vehicle => "id, plate1, plate2, plate3, rntrc, tare",
        EntityKind::Stock => "id, client_id, product_id, balance",
        EntityKind::Incoming => {
            "id, client_id, stock_id, vehicle_id, driver_id, gross_weight, vehicle_tare, \
             net_weight, created_at, status"
        }
        EntityKind::Shipping => {
            "id, client_id, stock_id, vehicle_id, driver_id, gross_weight, net_weight, created_at"
        }
        EntityKind::Enhancement => {
            "id, base_stock_id, final_stock_id, vehicle_id, gross_weight, net_weight, created_at"
        }
    }
}

fn decode(kind: EntityKind, row: &PgRow) -> Result<Entity, sqlx::Error> {
    let entity = match kind {
        EntityKind::Client => Entity::Client(Client {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
        }),
        EntityKind::Product => Entity::Product(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        }),
        EntityKind::Driver => Entity::Driver(Driver {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            cnh: row.try_get("cnh")?,
        }),
        EntityKind::Vehicle => Entity::Vehicle(Vehicle {
            id: row.try_get("id")?,
            plate1: row.try_get("plate1")?,
            plate2: row.try_get("plate2")?,
            plate3: row.try_get("plate3")?,
            rntrc: row.try_get("rntrc")?,
            tare: row.try_get("tare")?,
        }),
        EntityKind::Stock => Entity::Stock(Stock {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            product_id: row.try_get("product_id")?,
            balance: row.try_get("balance")?,
        }),
        EntityKind::Incoming => {
            let status: String = row.try_get("status")?;
            Entity::Incoming(Incoming {
                id: row.try_get("id")?,
                client_id: row.try_get("client_id")?,
                stock_id: row.try_get("stock_id")?,
                vehicle_id: row.try_get("vehicle_id")?,
                driver_id: row.try_get("driver_id")?,
                gross_weight: row.try_get("gross_weight")?,
                vehicle_tare: row.try_get("vehicle_tare")?,
                net_weight: row.try_get("net_weight")?,
                created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
                status: OpStatus::from_str(&status)
                    .ok_or_else(|| sqlx::Error::Decode(format!("unknown status {status}").into()))?,
            })
        }
        EntityKind::Shipping => Entity::Shipping(Shipping {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            stock_id: row.try_get("stock_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            driver_id: row.try_get("driver_id")?,
            gross_weight: row.try_get("gross_weight")?,
            net_weight: row.try_get("net_weight")?,
            created_at: row.try_get("created_at")?,
        }),
        EntityKind::Enhancement => Entity::Enhancement(Enhancement {
            id: row.try_get("id")?,
            base_stock_id: row.try_get("base_stock_id")?,
            final_stock_id: row.try_get("final_stock_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            gross_weight: row.try_get("gross_weight")?,
            net_weight: row.try_get("net_weight")?,
            created_at: row.try_get("created_at")?,
        }),
    };
    Ok(entity)
}

async fn insert_row(conn: &mut PgConnection, entity: &Entity) -> Result<i32, sqlx::Error> {
    match entity {
        Entity::Client(c) => {
            sqlx::query_scalar("INSERT INTO client (name, address) VALUES ($1, $2) RETURNING id")
                .bind(&c.name)
                .bind(&c.address)
                .fetch_one(&mut *conn)
                .await
        }
        Entity::Product(p) => {
            sqlx::query_scalar(
                "INSERT INTO product (name, description) VALUES ($1, $2) RETURNING id",
            )
            .bind(&p.name)
            .bind(&p.description)
            .fetch_one(&mut *conn)
            .await
        }
        Entity::Driver(d) => {
            sqlx::query_scalar("INSERT INTO driver (name, cnh) VALUES ($1, $2) RETURNING id")
                .bind(&d.name)
                .bind(&d.cnh)
                .fetch_one(&mut *conn)
                .await
        }
        Entity::Vehicle(v) => {
            sqlx::query_scalar(
                r#"
                INSERT INTO vehicle (plate1, plate2, plate3, rntrc, tare)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&v.plate1)
            .bind(&v.plate2)
            .bind(&v.plate3)
            .bind(&v.rntrc)
            .bind(v.tare)
            .fetch_one(&mut *conn)
            .await
        }
        Entity::Stock(s) => {
            sqlx::query_scalar(
                "INSERT INTO stock (client_id, product_id, balance) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(s.client_id)
            .bind(s.product_id)
            .bind(s.balance)
            .fetch_one(&mut *conn)
            .await
        }
        Entity::Incoming(m) => {
            sqlx::query_scalar(
                r#"
                INSERT INTO incoming (
                    client_id, stock_id, vehicle_id, driver_id, gross_weight,
                    vehicle_tare, net_weight, created_at, status
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                "#,
            )
            .bind(m.client_id)
            .bind(m.stock_id)
            .bind(m.vehicle_id)
            .bind(m.driver_id)
            .bind(m.gross_weight)
            .bind(m.vehicle_tare)
            .bind(m.net_weight)
            .bind(m.created_at)
            .bind(m.status.as_str())
            .fetch_one(&mut *conn)
            .await
        }
        Entity::Shipping(m) => {
            sqlx::query_scalar(
                r#"
                INSERT INTO shipping (
                    client_id, stock_id, vehicle_id, driver_id, gross_weight, net_weight, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(m.client_id)
            .bind(m.stock_id)
            .bind(m.vehicle_id)
            .bind(m.driver_id)
            .bind(m.gross_weight)
            .bind(m.net_weight)
            .bind(m.created_at)
            .fetch_one(&mut *conn)
            .await
        }
        Entity::Enhancement(m) => {
            sqlx::query_scalar(
                r#"
                INSERT INTO enhancement (
                    base_stock_id, final_stock_id, vehicle_id, gross_weight, net_weight, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(m.base_stock_id)
            .bind(m.final_stock_id)
            .bind(m.vehicle_id)
            .bind(m.gross_weight)
            .bind(m.net_weight)
            .bind(m.created_at)
            .fetch_one(&mut *conn)
            .await
        }
    }
}

/// Returns the number of rows touched
async fn update_row(conn: &mut PgConnection, entity: &Entity) -> Result<u64, sqlx::Error> {
    let result = match entity {
        Entity::Client(c) => {
            sqlx::query("UPDATE client SET name = $1, address = $2 WHERE id = $3")
                .bind(&c.name)
                .bind(&c.address)
                .bind(c.id)
                .execute(&mut *conn)
                .await?
        }
        Entity::Product(p) => {
            sqlx::query("UPDATE product SET name = $1, description = $2 WHERE id = $3")
                .bind(&p.name)
                .bind(&p.description)
                .bind(p.id)
                .execute(&mut *conn)
                .await?
        }
        Entity::Driver(d) => {
            sqlx::query("UPDATE driver SET name = $1, cnh = $2 WHERE id = $3")
                .bind(&d.name)
                .bind(&d.cnh)
                .bind(d.id)
                .execute(&mut *conn)
                .await?
        }
        Entity::Vehicle(v) => {
            sqlx::query(
                r#"
                UPDATE vehicle
                SET plate1 = $1, plate2 = $2, plate3 = $3, rntrc = $4, tare = $5
                WHERE id = $6
                "#,
            )
            .bind(&v.plate1)
            .bind(&v.plate2)
            .bind(&v.plate3)
            .bind(&v.rntrc)
            .bind(v.tare)
            .bind(v.id)
            .execute(&mut *conn)
            .await?
        }
        Entity::Stock(s) => {
            sqlx::query("UPDATE stock SET client_id = $1, product_id = $2, balance = $3 WHERE id = $4")
                .bind(s.client_id)
                .bind(s.product_id)
                .bind(s.balance)
                .bind(s.id)
                .execute(&mut *conn)
                .await?
        }
        Entity::Incoming(m) => {
            sqlx::query(
                r#"
                UPDATE incoming
                SET client_id = $1, stock_id = $2, vehicle_id = $3, driver_id = $4,
                    gross_weight = $5, vehicle_tare = $6, net_weight = $7, created_at = $8,
                    status = $9
                WHERE id = $10
                "#,
            )
            .bind(m.client_id)
            .bind(m.stock_id)
            .bind(m.vehicle_id)
            .bind(m.driver_id)
            .bind(m.gross_weight)
            .bind(m.vehicle_tare)
            .bind(m.net_weight)
            .bind(m.created_at)
            .bind(m.status.as_str())
            .bind(m.id)
            .execute(&mut *conn)
            .await?
        }
        Entity::Shipping(m) => {
            sqlx::query(
                r#"
                UPDATE shipping
                SET client_id = $1, stock_id = $2, vehicle_id = $3, driver_id = $4,
                    gross_weight = $5, net_weight = $6, created_at = $7
                WHERE id = $8
                "#,
            )
            .bind(m.client_id)
            .bind(m.stock_id)
            .bind(m.vehicle_id)
            .bind(m.driver_id)
            .bind(m.gross_weight)
            .bind(m.net_weight)
            .bind(m.created_at)
            .bind(m.id)
            .execute(&mut *conn)
            .await?
        }
        Entity::Enhancement(m) => {
            sqlx::query(
                r#"
                UPDATE enhancement
                SET base_stock_id = $1, final_stock_id = $2, vehicle_id = $3,
                    gross_weight = $4, net_weight = $5, created_at = $6
                WHERE id = $7
                "#,
            )
            .bind(m.base_stock_id)
            .bind(m.final_stock_id)
            .bind(m.vehicle_id)
            .bind(m.gross_weight)
            .bind(m.net_weight)
            .bind(m.created_at)
            .bind(m.id)
            .execute(&mut *conn)
            .await?
        }
    };
    Ok(result.rows_affected())
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_created(&self) -> AppResult<bool> {
        let existed: bool = sqlx::query_scalar("SELECT to_regclass('public.stock') IS NOT NULL")
            .fetch_one(&self.db)
            .await?;

        sqlx::migrate!("./migrations").run(&self.db).await?;

        Ok(!existed)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn find(&self, kind: EntityKind, id: i32) -> AppResult<Option<Entity>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            columns(kind),
            kind.table()
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.db).await?;

        Ok(row.map(|r| decode(kind, &r)).transpose()?)
    }

    async fn count(&self, kind: EntityKind) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.db).await?;
        Ok(count)
    }

    async fn list(&self, kind: EntityKind, offset: i64, limit: i64) -> AppResult<Vec<Entity>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT $1 OFFSET $2",
            columns(kind),
            kind.table()
        );
        let rows = sqlx::query(&sql)
            .bind(limit.max(0))
            .bind(offset.max(0))
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .iter()
            .map(|r| decode(kind, r))
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn commit(&self, work: UnitOfWork) -> AppResult<Vec<i32>> {
        if work.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.begin().await?;
        let mut assigned = Vec::new();

        // Any early return drops `tx`, which rolls the transaction back.
        for change in work.into_changes() {
            match change {
                Change::Insert(entity) => {
                    assigned.push(insert_row(&mut tx, &entity).await?);
                }
                Change::Update(entity) => {
                    if update_row(&mut tx, &entity).await? == 0 {
                        return Err(AppError::not_found(entity.kind(), entity.id()));
                    }
                }
                Change::Remove { kind, id } => {
                    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
                    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
                    if result.rows_affected() == 0 {
                        return Err(AppError::not_found(kind, id));
                    }
                }
                Change::AdjustBalance { stock_id, delta } => {
                    let result = sqlx::query("UPDATE stock SET balance = balance + $1 WHERE id = $2")
                        .bind(delta)
                        .bind(stock_id)
                        .execute(&mut *tx)
                        .await
                        .map_err(|err| balance_error(err, stock_id))?;
                    if result.rows_affected() == 0 {
                        return Err(AppError::not_found(EntityKind::Stock, stock_id));
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_database_errors() {
        let err = balance_error(sqlx::Error::RowNotFound, 3);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
