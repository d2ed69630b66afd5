use actix_web::{web, HttpResponse, ResponseError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::error;

use crate::config::Config;
use crate::core::{AppError, Result};
use crate::modules::connectors::repositories::AccountRepository;
use crate::modules::connectors::services::{GmailPayoutClient, PayoutMailbox, RistaClient};
use crate::modules::costing::models::{
    CostingFigure, DailyCosting, FigureSource, PeriodCosting,
};
use crate::modules::costing::repositories::{CostingCache, CostingRepository};
use crate::modules::costing::services::CostingService;
use crate::modules::inventory::services::InventoryService;
use crate::modules::sales::models::{ChannelSales, SalesChannel, SalesSource};
use crate::modules::sales::services::SalesService;

/// Query parameters for the food-cost report endpoint
#[derive(Debug, Deserialize)]
pub struct FoodCostReportQuery {
    /// POS branch code
    pub branch: String,
    /// Start of reporting period (inclusive, format: YYYY-MM-DD)
    pub start_date: String,
    /// End of reporting period (inclusive, format: YYYY-MM-DD)
    pub end_date: String,
}

/// Costing figure with provenance; amounts are strings for JSON precision
#[derive(Debug, Serialize)]
pub struct CostingFigureResponse {
    pub amount: String,
    pub source: FigureSource,
}

impl From<CostingFigure> for CostingFigureResponse {
    fn from(figure: CostingFigure) -> Self {
        Self {
            amount: figure.amount.to_string(),
            source: figure.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChannelSalesResponse {
    pub channel: SalesChannel,
    pub gross: String,
    pub net: String,
    pub orders: i64,
    pub source: SalesSource,
    pub pos_gross: Option<String>,
    pub payout_variance: Option<String>,
}

impl From<ChannelSales> for ChannelSalesResponse {
    fn from(row: ChannelSales) -> Self {
        Self {
            channel: row.channel,
            gross: row.gross.to_string(),
            net: row.net.to_string(),
            orders: row.orders,
            source: row.source,
            pos_gross: row.pos_gross.map(|d| d.to_string()),
            payout_variance: row.payout_variance.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyCostingResponse {
    pub date: String, // Format: YYYY-MM-DD
    pub opening: CostingFigureResponse,
    pub purchases: CostingFigureResponse,
    pub closing: CostingFigureResponse,
    pub gross_sales: CostingFigureResponse,
    pub channels: Vec<ChannelSalesResponse>,
    pub cogs: String,
    pub food_cost_pct: Option<String>,
    pub over_target: bool,
}

impl From<DailyCosting> for DailyCostingResponse {
    fn from(day: DailyCosting) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            opening: day.opening.into(),
            purchases: day.purchases.into(),
            closing: day.closing.into(),
            gross_sales: day.gross_sales.into(),
            channels: day
                .channels
                .into_iter()
                .map(ChannelSalesResponse::from)
                .collect(),
            cogs: day.cogs.to_string(),
            food_cost_pct: day.food_cost_pct.map(|p| p.to_string()),
            over_target: day.over_target,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FoodCostReportResponse {
    pub branch: String,
    pub start_date: String,
    pub end_date: String,
    pub days: Vec<DailyCostingResponse>,
    pub total_cogs: String,
    pub total_gross_sales: String,
    pub food_cost_pct: Option<String>,
    pub days_over_target: usize,
    pub estimated_days: usize,
}

impl From<PeriodCosting> for FoodCostReportResponse {
    fn from(report: PeriodCosting) -> Self {
        Self {
            branch: report.branch_code,
            start_date: report.start_date.format("%Y-%m-%d").to_string(),
            end_date: report.end_date.format("%Y-%m-%d").to_string(),
            days: report
                .days
                .into_iter()
                .map(DailyCostingResponse::from)
                .collect(),
            total_cogs: report.total_cogs.to_string(),
            total_gross_sales: report.total_gross_sales.to_string(),
            food_cost_pct: report.food_cost_pct.map(|p| p.to_string()),
            days_over_target: report.days_over_target,
            estimated_days: report.estimated_days,
        }
    }
}

/// GET /reports/food-cost
///
/// Period food-costing for one branch: per-day COGS and food-cost
/// percentage plus period totals computed from the summed figures.
pub async fn get_food_cost_report(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    restaurant_id: web::ReqData<String>,
    query: web::Query<FoodCostReportQuery>,
) -> HttpResponse {
    match handle_get_food_cost_report(pool, config, restaurant_id.into_inner(), query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("Failed to generate food-cost report: {}", e);
            e.error_response()
        }
    }
}

async fn handle_get_food_cost_report(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    restaurant_id: String,
    query: web::Query<FoodCostReportQuery>,
) -> Result<FoodCostReportResponse> {
    let start_date = NaiveDate::parse_from_str(&query.start_date, "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!(
            "Invalid start_date format: '{}'. Expected YYYY-MM-DD",
            query.start_date
        ))
    })?;

    let end_date = NaiveDate::parse_from_str(&query.end_date, "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!(
            "Invalid end_date format: '{}'. Expected YYYY-MM-DD",
            query.end_date
        ))
    })?;

    let service = build_costing_service(
        pool.get_ref().clone(),
        config.get_ref(),
        &restaurant_id,
        &query.branch,
    )
    .await?;

    let report = service
        .period_costing(&query.branch, start_date, end_date)
        .await?;

    Ok(FoodCostReportResponse::from(report))
}

/// Wire fetchers and services from the restaurant's connected accounts
async fn build_costing_service(
    pool: MySqlPool,
    config: &Config,
    restaurant_id: &str,
    branch_code: &str,
) -> Result<CostingService> {
    let accounts = AccountRepository::new(pool.clone());

    let rista_account = accounts
        .find_rista_for_branch(restaurant_id, branch_code)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No active Rista connection for branch '{}'",
                branch_code
            ))
        })?;

    let api_key = rista_account
        .api_key
        .ok_or_else(|| AppError::internal("Rista account is missing its API key"))?;
    let api_token = rista_account
        .api_token
        .ok_or_else(|| AppError::internal("Rista account is missing its API token"))?;

    let pos = Arc::new(RistaClient::new(&config.connectors, api_key, api_token)?);

    // Payout mailbox is optional; costing degrades to POS-only figures
    let mailbox: Option<Arc<dyn PayoutMailbox>> = match accounts.find_gmail(restaurant_id).await? {
        Some(account) => {
            let token = account
                .access_token
                .ok_or_else(|| AppError::internal("Gmail account is missing its access token"))?;
            Some(Arc::new(GmailPayoutClient::new(&config.connectors, token)?))
        }
        None => None,
    };

    let inventory = InventoryService::new(pos.clone(), config.app.max_lookback_days);
    let sales = SalesService::new(pos, mailbox);
    let cache: Arc<dyn CostingCache> = Arc::new(CostingRepository::new(pool));

    Ok(CostingService::new(
        inventory,
        sales,
        Some(cache),
        config.app.target_food_cost_pct,
    ))
}

/// Configure routes for the costing module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports").route("/food-cost", web::get().to(get_food_cost_report)),
    );
}
