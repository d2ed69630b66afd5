pub mod connectors;
pub mod costing;
pub mod health;
pub mod inventory;
pub mod sales;
