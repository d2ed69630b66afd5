pub mod daily_sales;

pub use daily_sales::{ChannelSales, DailySales, SalesChannel, SalesSource};
