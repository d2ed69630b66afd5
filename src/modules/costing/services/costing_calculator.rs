use crate::core::error::AppError;
use rust_decimal::Decimal;

/// CostingCalculator holds the food-costing arithmetic. Pure and
/// synchronous; fetching and fallback selection live in CostingService.
pub struct CostingCalculator;

impl CostingCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Cost of goods sold for a day:
    /// opening inventory + purchases − closing inventory
    pub fn daily_cogs(
        &self,
        opening: Decimal,
        purchases: Decimal,
        closing: Decimal,
    ) -> Result<Decimal, AppError> {
        self.validate_valuation("opening", opening)?;
        self.validate_valuation("purchases", purchases)?;
        self.validate_valuation("closing", closing)?;

        Ok(opening + purchases - closing)
    }

    /// Food-cost percentage: cogs / gross_sale × 100, rounded to 2 dp.
    /// Undefined when the day had no sales; never divides by zero.
    pub fn food_cost_pct(&self, cogs: Decimal, gross_sale: Decimal) -> Option<Decimal> {
        if gross_sale <= Decimal::ZERO {
            return None;
        }

        Some((cogs / gross_sale * Decimal::from(100)).round_dp(2))
    }

    /// Estimate a delayed closing valuation from the target food-cost
    /// ratio: closing = opening + purchases − gross × target. Floored at
    /// zero since stock value cannot go negative.
    pub fn estimate_closing(
        &self,
        opening: Decimal,
        purchases: Decimal,
        gross_sale: Decimal,
        target_ratio: Decimal,
    ) -> Decimal {
        let estimated = opening + purchases - gross_sale * target_ratio;
        estimated.max(Decimal::ZERO)
    }

    /// Inventory valuations and purchase totals cannot be negative
    pub fn validate_valuation(&self, field: &str, value: Decimal) -> Result<(), AppError> {
        if value < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "{} valuation cannot be negative: {}",
                field, value
            )));
        }

        Ok(())
    }
}

impl Default for CostingCalculator {
    fn default() -> Self {
        Self::new()
    }
}
