pub mod costing_calculator;
pub mod costing_service;

pub use costing_calculator::CostingCalculator;
pub use costing_service::CostingService;
