pub mod stock;

pub use stock::{PurchaseSummary, StockValuation};
