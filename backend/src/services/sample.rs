//! Demonstration dataset loaded into a freshly created store

use anyhow::Context;
use shared::{Client, Driver, Product, Stock, Vehicle};

use crate::error::AppResult;
use crate::store::{Store, UnitOfWork};

/// Opening balance of every sample stock
pub const SAMPLE_BALANCE: i32 = 50;

/// (product, client) positions, 1-based, of the sample stocks
const STOCK_PAIRS: [(usize, usize); 6] = [(1, 1), (2, 2), (3, 3), (1, 4), (3, 5), (2, 3)];

pub fn clients() -> Vec<Client> {
    (1..=5)
        .map(|n| Client {
            id: 0,
            name: format!("Client {}", n),
            address: format!("Client Address {}", n),
        })
        .collect()
}

pub fn products() -> Vec<Product> {
    (1..=3)
        .map(|n| Product {
            id: 0,
            name: format!("Product {}", n),
            description: format!("Product description {}", n),
        })
        .collect()
}

pub fn drivers() -> Vec<Driver> {
    (1..=4)
        .map(|n| Driver {
            id: 0,
            name: format!("Driver {}", n),
            cnh: format!("123456789{:02}", n),
        })
        .collect()
}

pub fn vehicles() -> Vec<Vehicle> {
    let vehicle = |plates: &[&str], rntrc: &str, tare: i32| Vehicle {
        id: 0,
        plate1: plates[0].to_string(),
        plate2: plates.get(1).map(|p| p.to_string()),
        plate3: plates.get(2).map(|p| p.to_string()),
        rntrc: Some(rntrc.to_string()),
        tare,
    };

    vec![
        vehicle(&["AB1C23"], "01234567", 13200),
        vehicle(&["AB1C24", "AB2C34"], "01234568", 14350),
        vehicle(&["AB1C25", "AB2C35"], "01234569", 13900),
        vehicle(&["AB1C26", "AB2C36", "AB3C45"], "01234560", 18150),
    ]
}

fn assigned(ids: &[i32], position: usize) -> AppResult<i32> {
    let id = ids
        .get(position - 1)
        .copied()
        .with_context(|| format!("sample row {} was not inserted", position))?;
    Ok(id)
}

/// Insert the sample dataset
///
/// Master data goes in first so the stocks can point at the ids the store
/// actually assigned.
pub async fn seed(store: &dyn Store) -> AppResult<()> {
    let client_ids = store
        .commit(clients().into_iter().fold(UnitOfWork::new(), |work, row| work.insert(row)))
        .await?;
    let product_ids = store
        .commit(products().into_iter().fold(UnitOfWork::new(), |work, row| work.insert(row)))
        .await?;

    let mut work = UnitOfWork::new();
    for (product, client) in STOCK_PAIRS {
        work = work.insert(Stock {
            id: 0,
            client_id: assigned(&client_ids, client)?,
            product_id: assigned(&product_ids, product)?,
            balance: SAMPLE_BALANCE,
        });
    }
    for driver in drivers() {
        work = work.insert(driver);
    }
    for vehicle in vehicles() {
        work = work.insert(vehicle);
    }
    store.commit(work).await?;

    tracing::info!(
        clients = client_ids.len(),
        products = product_ids.len(),
        stocks = STOCK_PAIRS.len(),
        "Seeded sample dataset"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::validation::{validate_cnh, validate_plate, validate_rntrc};

    #[test]
    fn test_sample_drivers_have_valid_cnh() {
        let cnhs: Vec<String> = drivers().into_iter().map(|d| d.cnh).collect();
        assert_eq!(cnhs[0], "12345678901");
        assert_eq!(cnhs[3], "12345678904");
        assert!(cnhs.iter().all(|c| validate_cnh(c).is_ok()));
    }

    #[test]
    fn test_sample_vehicles_are_valid() {
        let vehicles = vehicles();
        assert_eq!(
            vehicles.iter().map(|v| v.tare).collect::<Vec<_>>(),
            vec![13200, 14350, 13900, 18150]
        );
        assert_eq!(vehicles[0].plate2, None);
        assert_eq!(vehicles[3].plates().count(), 3);
        for v in &vehicles {
            assert!(v.plates().all(|p| validate_plate(p).is_ok()));
            assert!(v.rntrc.as_deref().map(validate_rntrc).unwrap_or(Ok(())).is_ok());
        }
    }
}
