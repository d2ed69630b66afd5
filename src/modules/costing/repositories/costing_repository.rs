// MySQL cache of computed costing days, keyed by branch + date.
//
// Only fully-actual days are written; estimated days are recomputed on
// every request so late day-end reports replace estimates naturally.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::costing::models::{CostingFigure, DailyCosting, FigureSource};
use crate::modules::sales::models::ChannelSales;

/// Store of computed costing days keyed by branch and date
#[async_trait]
pub trait CostingCache: Send + Sync {
    /// Cached days for a branch within an inclusive date range
    async fn fetch_range(
        &self,
        branch_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyCosting>>;

    /// Insert or replace the cached row for a branch-date
    async fn upsert(&self, day: &DailyCosting) -> Result<()>;
}

pub struct CostingRepository {
    pool: MySqlPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CostingRow {
    branch_code: String,
    date: NaiveDate,
    opening: Decimal,
    opening_source: String,
    purchases: Decimal,
    purchases_source: String,
    closing: Decimal,
    closing_source: String,
    gross_sales: Decimal,
    gross_source: String,
    /// Channel breakdown as a JSON document
    channels: String,
    cogs: Decimal,
    food_cost_pct: Option<Decimal>,
    over_target: bool,
}

fn figure(amount: Decimal, source: &str) -> Result<CostingFigure> {
    let source = FigureSource::parse(source)
        .ok_or_else(|| AppError::internal(format!("Unknown figure source '{}'", source)))?;
    Ok(CostingFigure { amount, source })
}

impl TryFrom<CostingRow> for DailyCosting {
    type Error = AppError;

    fn try_from(row: CostingRow) -> Result<Self> {
        let channels: Vec<ChannelSales> = serde_json::from_str(&row.channels)?;

        Ok(DailyCosting {
            opening: figure(row.opening, &row.opening_source)?,
            purchases: figure(row.purchases, &row.purchases_source)?,
            closing: figure(row.closing, &row.closing_source)?,
            gross_sales: figure(row.gross_sales, &row.gross_source)?,
            branch_code: row.branch_code,
            date: row.date,
            channels,
            cogs: row.cogs,
            food_cost_pct: row.food_cost_pct,
            over_target: row.over_target,
        })
    }
}

impl CostingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CostingCache for CostingRepository {
    async fn fetch_range(
        &self,
        branch_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyCosting>> {
        let rows = sqlx::query_as::<_, CostingRow>(
            r#"
            SELECT branch_code, date, opening, opening_source,
                   purchases, purchases_source, closing, closing_source,
                   gross_sales, gross_source, channels, cogs,
                   food_cost_pct, over_target
            FROM daily_costing_cache
            WHERE branch_code = ? AND date BETWEEN ? AND ?
            ORDER BY date
            "#,
        )
        .bind(branch_code)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch cached costing: {}", e)))?;

        rows.into_iter().map(DailyCosting::try_from).collect()
    }

    async fn upsert(&self, day: &DailyCosting) -> Result<()> {
        let channels = serde_json::to_string(&day.channels)?;

        sqlx::query(
            r#"
            INSERT INTO daily_costing_cache (
                branch_code, date, opening, opening_source,
                purchases, purchases_source, closing, closing_source,
                gross_sales, gross_source, channels, cogs,
                food_cost_pct, over_target, computed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            ON DUPLICATE KEY UPDATE
                opening = VALUES(opening),
                opening_source = VALUES(opening_source),
                purchases = VALUES(purchases),
                purchases_source = VALUES(purchases_source),
                closing = VALUES(closing),
                closing_source = VALUES(closing_source),
                gross_sales = VALUES(gross_sales),
                gross_source = VALUES(gross_source),
                channels = VALUES(channels),
                cogs = VALUES(cogs),
                food_cost_pct = VALUES(food_cost_pct),
                over_target = VALUES(over_target),
                computed_at = NOW()
            "#,
        )
        .bind(&day.branch_code)
        .bind(day.date)
        .bind(day.opening.amount)
        .bind(day.opening.source.as_str())
        .bind(day.purchases.amount)
        .bind(day.purchases.source.as_str())
        .bind(day.closing.amount)
        .bind(day.closing.source.as_str())
        .bind(day.gross_sales.amount)
        .bind(day.gross_sales.source.as_str())
        .bind(channels)
        .bind(day.cogs)
        .bind(day.food_cost_pct)
        .bind(day.over_target)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to cache costing day: {}", e)))?;

        Ok(())
    }
}
