//! Core services: stock ledger, entity repository and listings

pub mod ledger;
pub mod listing;
pub mod repository;
pub mod sample;

pub use ledger::{MissingVehiclePolicy, StockLedger};
pub use listing::{EntityDetails, ListingService, PageOutcome};
pub use repository::{EntityRepository, UpdateOutcome};
