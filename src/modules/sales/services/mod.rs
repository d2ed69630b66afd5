pub mod sales_service;

pub use sales_service::{merge_payouts, SalesService};
