//! Domain models for Warehouse Manager

mod catalog;
mod entity;
mod fleet;
mod movement;
mod parties;

pub use catalog::*;
pub use entity::*;
pub use fleet::*;
pub use movement::*;
pub use parties::*;
