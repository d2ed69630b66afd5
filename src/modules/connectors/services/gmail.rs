use super::provider_trait::{Aggregator, PayoutMailbox, PayoutStatement};
use crate::config::ConnectorConfig;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, NaiveDate};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::warn;

/// Labels a gross-order-value line may carry in a payout email
pub const GROSS_LABELS: [&str; 3] = ["gross order value", "total order value", "order value"];

/// Labels a net-payout line may carry in a payout email
pub const NET_LABELS: [&str; 3] = ["net payout", "amount credited", "payout amount"];

/// Gmail payout mailbox client
///
/// Implements PayoutMailbox over the Gmail REST API: searches for
/// aggregator payout emails covering a business date and parses the
/// gross order value and net payout out of the message body.
pub struct GmailPayoutClient {
    client: ClientWithMiddleware,
    access_token: String,
    base_url: String,
}

impl GmailPayoutClient {
    pub fn new(config: &ConnectorConfig, access_token: String) -> Result<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let inner = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            access_token,
            base_url: config.gmail_base_url.clone(),
        })
    }

    /// Payout mails land the day after the business date they cover, so the
    /// search window spans the date itself plus the following two days.
    fn search_query(aggregator: Aggregator, date: NaiveDate) -> String {
        let after = date.format("%Y/%m/%d");
        let before = (date + Duration::days(3)).format("%Y/%m/%d");
        format!(
            "from:{} subject:payout after:{} before:{}",
            aggregator.payout_sender(),
            after,
            before
        )
    }

    async fn fetch_statement(
        &self,
        aggregator: Aggregator,
        date: NaiveDate,
    ) -> Result<Option<PayoutStatement>> {
        let url = format!("{}/gmail/v1/users/me/messages", self.base_url);
        let query = Self::search_query(aggregator, date);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str()), ("maxResults", "5")])
            .send()
            .await
            .map_err(|e| AppError::connector(format!("Gmail search failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::connector(format!("Failed to read Gmail response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::connector(format!(
                "Gmail API error - HTTP {} ({})",
                status.as_u16(),
                body
            )));
        }

        let list: MessageList = serde_json::from_str(&body)
            .map_err(|e| AppError::connector(format!("Failed to parse Gmail response: {}", e)))?;

        for message_ref in list.messages.unwrap_or_default() {
            match self.parse_message(aggregator, date, &message_ref.id).await {
                Ok(Some(statement)) => return Ok(Some(statement)),
                Ok(None) => {
                    warn!(
                        aggregator = aggregator.as_str(),
                        message_id = %message_ref.id,
                        "Payout email did not contain parseable figures, skipping"
                    );
                }
                Err(e) => {
                    warn!(
                        aggregator = aggregator.as_str(),
                        message_id = %message_ref.id,
                        error = %e,
                        "Failed to fetch payout email, skipping"
                    );
                }
            }
        }

        Ok(None)
    }

    async fn parse_message(
        &self,
        aggregator: Aggregator,
        date: NaiveDate,
        message_id: &str,
    ) -> Result<Option<PayoutStatement>> {
        let url = format!("{}/gmail/v1/users/me/messages/{}", self.base_url, message_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await
            .map_err(|e| AppError::connector(format!("Gmail message fetch failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::connector(format!("Failed to read Gmail message: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::connector(format!(
                "Gmail API error - HTTP {} ({})",
                status.as_u16(),
                body
            )));
        }

        let message: GmailMessage = serde_json::from_str(&body)
            .map_err(|e| AppError::connector(format!("Failed to parse Gmail message: {}", e)))?;

        let text = message
            .payload
            .map(|p| extract_plain_text(&p))
            .unwrap_or_default();

        let gross = parse_labeled_amount(&text, &GROSS_LABELS);
        let net = parse_labeled_amount(&text, &NET_LABELS);

        Ok(match (gross, net) {
            (Some(gross_order_value), Some(net_payout)) => Some(PayoutStatement {
                aggregator,
                date,
                gross_order_value,
                net_payout,
                message_id: message.id,
            }),
            _ => None,
        })
    }
}

#[async_trait]
impl PayoutMailbox for GmailPayoutClient {
    async fn payout_statements(&self, date: NaiveDate) -> Result<Vec<PayoutStatement>> {
        let mut statements = Vec::new();

        for aggregator in Aggregator::ALL {
            match self.fetch_statement(aggregator, date).await {
                Ok(Some(statement)) => statements.push(statement),
                // Delayed or absent payout mail: the POS figure stands
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        aggregator = aggregator.as_str(),
                        date = %date,
                        error = %e,
                        "Payout mailbox lookup failed, falling back to POS figures"
                    );
                }
            }
        }

        Ok(statements)
    }

    fn name(&self) -> &str {
        "gmail"
    }
}

/// Walk a Gmail payload tree and concatenate all text/plain bodies
fn extract_plain_text(payload: &GmailPayload) -> String {
    let mut text = String::new();

    let is_plain = payload
        .mime_type
        .as_deref()
        .map(|m| m.starts_with("text/plain"))
        .unwrap_or(false);

    if is_plain {
        if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
            if let Some(decoded) = decode_body(data) {
                text.push_str(&decoded);
                text.push('\n');
            }
        }
    }

    for part in payload.parts.as_deref().unwrap_or_default() {
        text.push_str(&extract_plain_text(part));
    }

    text
}

/// Gmail bodies are base64url, sometimes padded
fn decode_body(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok()
}

/// Find a line carrying one of the labels and parse the amount after it.
/// Matching is case-insensitive; the first label hit wins.
pub fn parse_labeled_amount(text: &str, labels: &[&str]) -> Option<Decimal> {
    for line in text.lines() {
        let lower = line.to_lowercase();
        for label in labels {
            if let Some(pos) = lower.find(label) {
                let rest = &line[pos + label.len()..];
                if let Some(amount) = parse_inr_amount(rest) {
                    return Some(amount);
                }
            }
        }
    }
    None
}

/// Parse an INR amount out of free text: skips currency markers (₹, Rs.,
/// INR) and separators, tolerates Indian comma grouping. The digits must
/// directly follow a separator or a currency marker, so narrative numbers
/// ("will arrive in 2 days") never parse as an amount.
pub fn parse_inr_amount(text: &str) -> Option<Decimal> {
    let first_digit = text.find(|c: char| c.is_ascii_digit())?;
    if !amount_prefix_ok(&text[..first_digit]) {
        return None;
    }

    let mut digits = String::new();

    for c in text[first_digit..].chars() {
        match c {
            '0'..='9' => digits.push(c),
            '.' => digits.push(c),
            ',' => {} // grouping separator
            _ => break,
        }
    }

    // A full stop after the amount is sentence punctuation
    Decimal::from_str(digits.trim_end_matches('.')).ok()
}

/// Whatever sits between the label and the digits must be a separator, a
/// currency marker, or nothing at all
fn amount_prefix_ok(prefix: &str) -> bool {
    let prefix = prefix.trim_end();
    if prefix.is_empty() || prefix.ends_with([':', '-', '=', '₹']) {
        return true;
    }

    let lower = prefix.to_lowercase();
    lower.ends_with("rs") || lower.ends_with("rs.") || lower.ends_with("inr")
}

// Gmail API response structures

#[derive(Debug, Deserialize)]
struct MessageList {
    messages: Option<Vec<MessageRef>>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessage {
    id: String,
    payload: Option<GmailPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPayload {
    mime_type: Option<String>,
    body: Option<GmailBody>,
    parts: Option<Vec<GmailPayload>>,
}

#[derive(Debug, Deserialize)]
struct GmailBody {
    data: Option<String>,
}
