use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closing stock valuation for a branch at the end of a business date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockValuation {
    pub branch_code: String,
    pub date: NaiveDate,
    /// Total value of on-hand inventory
    pub value: Decimal,
    /// Number of stock items behind the valuation
    pub item_count: i64,
}

/// Purchase orders received by a branch on a business date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseSummary {
    pub branch_code: String,
    pub date: NaiveDate,
    pub value: Decimal,
    pub order_count: i64,
}
