pub mod models;
pub mod services;

pub use models::{ChannelSales, DailySales, SalesChannel, SalesSource};
pub use services::SalesService;
