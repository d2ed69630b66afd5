use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue channel a sale was recorded under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesChannel {
    DineIn,
    Takeaway,
    Swiggy,
    Zomato,
    Other,
}

impl SalesChannel {
    /// Map a POS channel label to a channel. Rista labels are free-form
    /// per branch, so matching is case-insensitive and substring-based.
    pub fn from_pos_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("swiggy") {
            SalesChannel::Swiggy
        } else if label.contains("zomato") {
            SalesChannel::Zomato
        } else if label.contains("dine") || label.contains("table") {
            SalesChannel::DineIn
        } else if label.contains("take") || label.contains("parcel") || label.contains("pickup") {
            SalesChannel::Takeaway
        } else {
            SalesChannel::Other
        }
    }

    /// Channels settled through delivery-aggregator payouts
    pub fn is_aggregator(&self) -> bool {
        matches!(self, SalesChannel::Swiggy | SalesChannel::Zomato)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SalesChannel::DineIn => "dine_in",
            SalesChannel::Takeaway => "takeaway",
            SalesChannel::Swiggy => "swiggy",
            SalesChannel::Zomato => "zomato",
            SalesChannel::Other => "other",
        }
    }
}

/// Where a channel figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesSource {
    Pos,
    PayoutEmail,
}

/// One channel's sales for a branch-day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSales {
    pub channel: SalesChannel,
    /// Gross sale value for the channel
    pub gross: Decimal,
    /// Net value after discounts/commission where the source reports it
    pub net: Decimal,
    pub orders: i64,
    pub source: SalesSource,
    /// POS-recorded gross kept for reference when a payout email overrode it
    pub pos_gross: Option<Decimal>,
    /// payout gross − POS gross, when both figures exist
    pub payout_variance: Option<Decimal>,
}

impl ChannelSales {
    pub fn from_pos(channel: SalesChannel, gross: Decimal, net: Decimal, orders: i64) -> Self {
        Self {
            channel,
            gross,
            net,
            orders,
            source: SalesSource::Pos,
            pos_gross: None,
            payout_variance: None,
        }
    }
}

/// Multi-channel sales for one branch and business date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySales {
    pub branch_code: String,
    pub date: NaiveDate,
    pub channels: Vec<ChannelSales>,
}

impl DailySales {
    pub fn new(branch_code: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            branch_code: branch_code.into(),
            date,
            channels: Vec::new(),
        }
    }

    /// Gross sale across all channels; the `grossSale` input to costing
    pub fn gross_total(&self) -> Decimal {
        self.channels.iter().map(|c| c.gross).sum()
    }

    pub fn net_total(&self) -> Decimal {
        self.channels.iter().map(|c| c.net).sum()
    }

    pub fn order_total(&self) -> i64 {
        self.channels.iter().map(|c| c.orders).sum()
    }

    pub fn channel_mut(&mut self, channel: SalesChannel) -> Option<&mut ChannelSales> {
        self.channels.iter_mut().find(|c| c.channel == channel)
    }
}
