//! Infrastructure layer: stores, services over them, configuration.

pub mod catalog;
pub mod config;
pub mod intake;
pub mod inventory;
pub mod seed;
pub mod store;

pub use catalog::{CatalogError, CatalogQueries};
pub use config::AppConfig;
pub use intake::{IntakeError, OrderIntake};
pub use inventory::{InventoryError, InventoryMutator, MutatorSettings, UpdateStrategy};
