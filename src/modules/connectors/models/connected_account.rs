use crate::core::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of external data source an account connects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Rista POS branch credentials
    Rista,
    /// Gmail payout mailbox token
    Gmail,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Rista => write!(f, "rista"),
            AccountKind::Gmail => write!(f, "gmail"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rista" => Ok(AccountKind::Rista),
            "gmail" => Ok(AccountKind::Gmail),
            other => Err(AppError::validation(format!(
                "Unknown account kind: '{}'",
                other
            ))),
        }
    }
}

/// A stored link between a restaurant and an external data source.
/// Credentials live here; base URLs and HTTP tuning are configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub restaurant_id: String,
    pub kind: AccountKind,
    /// Owner-facing label ("Koramangala branch POS")
    pub label: String,
    /// POS branch code; required for Rista accounts
    pub branch_code: Option<String>,
    /// Rista API key
    pub api_key: Option<String>,
    /// Rista API token
    pub api_token: Option<String>,
    /// Gmail OAuth access token (refresh handled by the dashboard)
    pub access_token: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectedAccount {
    /// Check kind-specific required fields
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(AppError::validation("Account label must not be empty"));
        }

        match self.kind {
            AccountKind::Rista => {
                if self.branch_code.as_deref().unwrap_or("").trim().is_empty() {
                    return Err(AppError::validation(
                        "Rista accounts require a branch code",
                    ));
                }
                if self.api_key.is_none() || self.api_token.is_none() {
                    return Err(AppError::validation(
                        "Rista accounts require an API key and token",
                    ));
                }
            }
            AccountKind::Gmail => {
                if self.access_token.as_deref().unwrap_or("").trim().is_empty() {
                    return Err(AppError::validation(
                        "Gmail accounts require an access token",
                    ));
                }
            }
        }

        Ok(())
    }
}
