use crate::core::Result;
use crate::modules::inventory::models::{PurchaseSummary, StockValuation};
use crate::modules::sales::models::{DailySales, SalesChannel};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-of-sale provider: source of sales, stock, and purchase figures.
///
/// All methods take a branch code and an IST business date. `Ok(None)` means
/// the provider has no report for that date yet (day-end not run, branch
/// closed); transport failures and non-2xx responses are errors.
#[async_trait]
pub trait PosProvider: Send + Sync {
    /// Multi-channel sales summary for the date
    async fn sales_summary(&self, branch_code: &str, date: NaiveDate)
        -> Result<Option<DailySales>>;

    /// Closing stock valuation for the date
    async fn stock_valuation(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<StockValuation>>;

    /// Purchase orders received on the date
    async fn purchase_summary(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<PurchaseSummary>>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Delivery aggregator behind a payout statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    Swiggy,
    Zomato,
}

impl Aggregator {
    pub const ALL: [Aggregator; 2] = [Aggregator::Swiggy, Aggregator::Zomato];

    /// Sender address the aggregator's payout mails come from
    pub fn payout_sender(&self) -> &'static str {
        match self {
            Aggregator::Swiggy => "noreply@swiggy.in",
            Aggregator::Zomato => "payouts@zomato.com",
        }
    }

    /// Sales channel the aggregator's orders land on
    pub fn channel(&self) -> SalesChannel {
        match self {
            Aggregator::Swiggy => SalesChannel::Swiggy,
            Aggregator::Zomato => SalesChannel::Zomato,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::Swiggy => "swiggy",
            Aggregator::Zomato => "zomato",
        }
    }
}

/// Figures parsed out of one aggregator payout email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutStatement {
    pub aggregator: Aggregator,
    /// Business date the payout covers
    pub date: NaiveDate,
    /// Gross order value the aggregator billed customers
    pub gross_order_value: Decimal,
    /// Amount actually credited after commission and fees
    pub net_payout: Decimal,
    /// Mailbox message the figures were parsed from
    pub message_id: String,
}

/// Mailbox holding aggregator payout emails
#[async_trait]
pub trait PayoutMailbox: Send + Sync {
    /// Payout statements covering the given business date.
    /// Delayed or absent emails yield an empty vector, not an error.
    async fn payout_statements(&self, date: NaiveDate) -> Result<Vec<PayoutStatement>>;

    /// Get mailbox provider name
    fn name(&self) -> &str;
}
