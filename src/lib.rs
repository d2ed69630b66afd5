//! PlateWise Restaurant Cost Analytics Library
//!
//! Core functionality for the PlateWise food-costing service: connectors
//! for POS and payout data sources, the daily costing engine, and the
//! report API the dashboard consumes.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::connectors;
pub use modules::costing;
pub use modules::inventory;
pub use modules::sales;
