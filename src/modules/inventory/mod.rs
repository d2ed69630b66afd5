pub mod models;
pub mod services;

pub use models::{PurchaseSummary, StockValuation};
pub use services::InventoryService;
