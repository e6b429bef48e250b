//! HTTP handlers

pub mod entities;
pub mod health;
pub mod movements;

pub use entities::*;
pub use health::*;
pub use movements::*;
