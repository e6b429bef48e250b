//! Shared types and models for Warehouse Manager
//!
//! This crate contains the entity models, paging metadata and field
//! validation used by the backend and by any client of its API.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
