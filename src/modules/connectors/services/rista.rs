use super::provider_trait::PosProvider;
use crate::config::ConnectorConfig;
use crate::core::{AppError, Result};
use crate::modules::inventory::models::{PurchaseSummary, StockValuation};
use crate::modules::sales::models::{ChannelSales, DailySales, SalesChannel};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Rista POS API client
///
/// Implements PosProvider over the Rista report endpoints. Requests carry
/// the branch API key/token pair; dates are IST business dates.
pub struct RistaClient {
    client: ClientWithMiddleware,
    api_key: String,
    api_token: String,
    base_url: String,
}

impl RistaClient {
    /// Create a new Rista client for one branch credential pair.
    /// Transient failures are retried with exponential backoff.
    pub fn new(config: &ConnectorConfig, api_key: String, api_token: String) -> Result<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key,
            api_token,
            base_url: config.rista_base_url.clone(),
        })
    }

    /// Issue a dated report request; `Ok(None)` when the report is absent
    async fn get_report<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let day = date.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-api-token", &self.api_token)
            .header("Accept", "application/json")
            .query(&[("branch", branch_code), ("day", day.as_str())])
            .send()
            .await
            .map_err(|e| AppError::connector(format!("Rista API request failed: {}", e)))?;

        let status = response.status();

        // Day-end not run yet or branch closed: no report, not an error
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::connector(format!("Failed to read Rista response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::connector(format!(
                "Rista API error - HTTP {} ({})",
                status.as_u16(),
                body
            )));
        }

        let parsed: T = serde_json::from_str(&body)
            .map_err(|e| AppError::connector(format!("Failed to parse Rista response: {}", e)))?;

        Ok(Some(parsed))
    }
}

#[async_trait]
impl PosProvider for RistaClient {
    async fn sales_summary(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySales>> {
        let response: Option<RistaSalesSummary> = self
            .get_report("/sales/summary", branch_code, date)
            .await?;

        Ok(response.map(|summary| summary.into_daily_sales(branch_code, date)))
    }

    async fn stock_valuation(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<StockValuation>> {
        let response: Option<RistaStockValuation> = self
            .get_report("/inventory/valuation", branch_code, date)
            .await?;

        Ok(response.map(|v| StockValuation {
            branch_code: branch_code.to_string(),
            date,
            value: v.total_value,
            item_count: v.item_count,
        }))
    }

    async fn purchase_summary(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<Option<PurchaseSummary>> {
        let response: Option<RistaPurchaseSummary> = self
            .get_report("/purchase/summary", branch_code, date)
            .await?;

        Ok(response.map(|p| PurchaseSummary {
            branch_code: branch_code.to_string(),
            date,
            value: p.total_value,
            order_count: p.order_count,
        }))
    }

    fn name(&self) -> &str {
        "rista"
    }
}

// Rista API response structures

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RistaSalesSummary {
    channels: Vec<RistaChannelRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RistaChannelRow {
    channel: String,
    gross_amount: Decimal,
    net_amount: Decimal,
    order_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RistaStockValuation {
    total_value: Decimal,
    item_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RistaPurchaseSummary {
    total_value: Decimal,
    order_count: i64,
}

impl RistaSalesSummary {
    /// Fold POS channel rows into DailySales. Several POS labels can map to
    /// the same channel ("Parcel", "Pickup"), so rows are accumulated.
    fn into_daily_sales(self, branch_code: &str, date: NaiveDate) -> DailySales {
        let mut sales = DailySales::new(branch_code, date);

        for row in self.channels {
            let channel = SalesChannel::from_pos_label(&row.channel);
            match sales.channel_mut(channel) {
                Some(existing) => {
                    existing.gross += row.gross_amount;
                    existing.net += row.net_amount;
                    existing.orders += row.order_count;
                }
                None => sales.channels.push(ChannelSales::from_pos(
                    channel,
                    row.gross_amount,
                    row.net_amount,
                    row.order_count,
                )),
            }
        }

        sales
    }
}
