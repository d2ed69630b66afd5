pub mod connector_controller;

pub use connector_controller::configure;
