use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::sales::models::ChannelSales;

/// Provenance of a costing input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureSource {
    /// Reported by the data source for the exact expected date
    Actual,
    /// Derived through a fallback rule (lookback hit on an older day,
    /// closing stock estimated from the target food-cost percentage)
    Estimated,
    /// No usable input found; valued at zero
    Missing,
}

impl FigureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FigureSource::Actual => "actual",
            FigureSource::Estimated => "estimated",
            FigureSource::Missing => "missing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "actual" => Some(FigureSource::Actual),
            "estimated" => Some(FigureSource::Estimated),
            "missing" => Some(FigureSource::Missing),
            _ => None,
        }
    }
}

/// One costing input with its provenance
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostingFigure {
    pub amount: Decimal,
    pub source: FigureSource,
}

impl CostingFigure {
    pub fn actual(amount: Decimal) -> Self {
        Self {
            amount,
            source: FigureSource::Actual,
        }
    }

    pub fn estimated(amount: Decimal) -> Self {
        Self {
            amount,
            source: FigureSource::Estimated,
        }
    }

    pub fn missing() -> Self {
        Self {
            amount: Decimal::ZERO,
            source: FigureSource::Missing,
        }
    }

    pub fn is_actual(&self) -> bool {
        self.source == FigureSource::Actual
    }
}

/// Food-costing result for one branch and business date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCosting {
    pub branch_code: String,
    pub date: NaiveDate,
    /// Opening inventory: previous working day's closing valuation
    pub opening: CostingFigure,
    /// Purchase orders received on the date
    pub purchases: CostingFigure,
    /// Closing stock valuation at day end
    pub closing: CostingFigure,
    /// Gross sale across all channels
    pub gross_sales: CostingFigure,
    /// Channel-level sales breakdown behind the gross figure
    pub channels: Vec<ChannelSales>,
    /// opening + purchases − closing
    pub cogs: Decimal,
    /// cogs / gross × 100, absent when the day had no sales
    pub food_cost_pct: Option<Decimal>,
    pub over_target: bool,
}

impl DailyCosting {
    /// A day is final when every input came straight from its source;
    /// only such days are cached.
    pub fn is_fully_actual(&self) -> bool {
        self.opening.is_actual()
            && self.purchases.is_actual()
            && self.closing.is_actual()
            && self.gross_sales.is_actual()
    }
}

/// Costing aggregated over an inclusive date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCosting {
    pub branch_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailyCosting>,
    pub total_cogs: Decimal,
    pub total_gross_sales: Decimal,
    /// Computed from the period sums, not averaged over daily percentages
    pub food_cost_pct: Option<Decimal>,
    pub days_over_target: usize,
    pub estimated_days: usize,
}

impl PeriodCosting {
    pub fn from_days(
        branch_code: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        days: Vec<DailyCosting>,
    ) -> Self {
        let total_cogs: Decimal = days.iter().map(|d| d.cogs).sum();
        let total_gross_sales: Decimal = days.iter().map(|d| d.gross_sales.amount).sum();

        let food_cost_pct = if total_gross_sales > Decimal::ZERO {
            Some(
                (total_cogs / total_gross_sales * Decimal::from(100)).round_dp(2),
            )
        } else {
            None
        };

        let days_over_target = days.iter().filter(|d| d.over_target).count();
        let estimated_days = days.iter().filter(|d| !d.is_fully_actual()).count();

        Self {
            branch_code,
            start_date,
            end_date,
            days,
            total_cogs,
            total_gross_sales,
            food_cost_pct,
            days_over_target,
            estimated_days,
        }
    }
}
