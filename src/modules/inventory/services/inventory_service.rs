use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::Result;
use crate::modules::connectors::services::PosProvider;
use crate::modules::costing::models::CostingFigure;
use crate::modules::inventory::models::StockValuation;

/// The day whose closing valuation serves as opening inventory for `date`:
/// the previous day, or the Saturday before when `date` is a Monday
/// (branches close on Sundays and run no day-end there).
pub fn opening_lookback_date(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Mon {
        date - Duration::days(2)
    } else {
        date - Duration::days(1)
    }
}

/// Fetches stock and purchase figures and applies the opening-inventory
/// fallback rules.
pub struct InventoryService {
    pos: Arc<dyn PosProvider>,
    max_lookback_days: u32,
}

impl InventoryService {
    pub fn new(pos: Arc<dyn PosProvider>, max_lookback_days: u32) -> Self {
        Self {
            pos,
            max_lookback_days,
        }
    }

    /// Opening inventory for a business date.
    ///
    /// Tries the expected lookback day first; a hit there is `actual`.
    /// Otherwise scans further back within the lookback window for the
    /// most recent closing valuation and marks the figure `estimated`.
    /// Nothing in the window means `missing`, valued at zero.
    pub async fn opening_for(&self, branch_code: &str, date: NaiveDate) -> Result<CostingFigure> {
        let expected = opening_lookback_date(date);

        if let Some(valuation) = self.pos.stock_valuation(branch_code, expected).await? {
            return Ok(CostingFigure::actual(valuation.value));
        }

        let floor = date - Duration::days(self.max_lookback_days as i64);
        let mut day = expected - Duration::days(1);

        while day >= floor {
            if let Some(valuation) = self.pos.stock_valuation(branch_code, day).await? {
                debug!(
                    branch = branch_code,
                    date = %date,
                    found_on = %day,
                    "Opening inventory taken from an older closing valuation"
                );
                return Ok(CostingFigure::estimated(valuation.value));
            }
            day -= Duration::days(1);
        }

        warn!(
            branch = branch_code,
            date = %date,
            lookback_days = self.max_lookback_days,
            "No closing valuation found in lookback window, opening treated as zero"
        );
        Ok(CostingFigure::missing())
    }

    /// Purchases received on the date; absent report counts as zero
    pub async fn purchases_for(&self, branch_code: &str, date: NaiveDate) -> Result<CostingFigure> {
        match self.pos.purchase_summary(branch_code, date).await? {
            Some(summary) => Ok(CostingFigure::actual(summary.value)),
            None => Ok(CostingFigure::missing()),
        }
    }

    /// Raw closing valuation for the date, if the day-end report exists.
    /// Estimation of a delayed closing needs the day's gross sale, so it
    /// happens in CostingService.
    pub async fn closing_for(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<StockValuation>> {
        self.pos.stock_valuation(branch_code, date).await
    }
}
