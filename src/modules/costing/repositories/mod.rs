pub mod costing_repository;

pub use costing_repository::{CostingCache, CostingRepository};
