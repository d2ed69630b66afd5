pub mod costing_controller;

pub use costing_controller::configure;
