pub mod inventory_service;

pub use inventory_service::{opening_lookback_date, InventoryService};
