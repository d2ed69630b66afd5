// MySQL CRUD for connected accounts.
//
// Queries bind at runtime so the crate builds without a live schema;
// rows map through AccountRow because `kind` is stored as a string.

use sqlx::MySqlPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::connectors::models::{AccountKind, ConnectedAccount};

/// Repository for connected-account database operations
pub struct AccountRepository {
    pool: MySqlPool,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    restaurant_id: String,
    kind: String,
    label: String,
    branch_code: Option<String>,
    api_key: Option<String>,
    api_token: Option<String>,
    access_token: Option<String>,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<AccountRow> for ConnectedAccount {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(ConnectedAccount {
            kind: AccountKind::from_str(&row.kind)?,
            id: row.id,
            restaurant_id: row.restaurant_id,
            label: row.label,
            branch_code: row.branch_code,
            api_key: row.api_key,
            api_token: row.api_token,
            access_token: row.access_token,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, restaurant_id, kind, label, branch_code, \
     api_key, api_token, access_token, is_active, created_at, updated_at";

impl AccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a new connected account; generates the id when absent
    pub async fn create(&self, account: &ConnectedAccount) -> Result<ConnectedAccount> {
        account.validate()?;

        let id = if account.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            account.id.clone()
        };

        sqlx::query(
            r#"
            INSERT INTO connected_accounts (
                id, restaurant_id, kind, label, branch_code,
                api_key, api_token, access_token, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&account.restaurant_id)
        .bind(account.kind.to_string())
        .bind(&account.label)
        .bind(&account.branch_code)
        .bind(&account.api_key)
        .bind(&account.api_token)
        .bind(&account.access_token)
        .bind(account.is_active)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "A '{}' account with this branch already exists",
                        account.kind
                    ));
                }
            }
            AppError::Internal(format!("Failed to create connected account: {}", e))
        })?;

        let mut created = account.clone();
        created.id = id;
        Ok(created)
    }

    /// All accounts for a restaurant, newest first
    pub async fn list_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<ConnectedAccount>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM connected_accounts \
             WHERE restaurant_id = ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to list connected accounts: {}", e)))?;

        rows.into_iter().map(ConnectedAccount::try_from).collect()
    }

    pub async fn find_by_id(
        &self,
        restaurant_id: &str,
        id: &str,
    ) -> Result<Option<ConnectedAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM connected_accounts WHERE id = ? AND restaurant_id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch connected account: {}", e)))?;

        row.map(ConnectedAccount::try_from).transpose()
    }

    /// Active Rista account for a branch of the restaurant
    pub async fn find_rista_for_branch(
        &self,
        restaurant_id: &str,
        branch_code: &str,
    ) -> Result<Option<ConnectedAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM connected_accounts \
             WHERE restaurant_id = ? AND kind = 'rista' AND branch_code = ? \
               AND is_active = TRUE \
             LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(restaurant_id)
        .bind(branch_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch Rista account: {}", e)))?;

        row.map(ConnectedAccount::try_from).transpose()
    }

    /// Active Gmail payout mailbox for the restaurant, if connected
    pub async fn find_gmail(&self, restaurant_id: &str) -> Result<Option<ConnectedAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM connected_accounts \
             WHERE restaurant_id = ? AND kind = 'gmail' AND is_active = TRUE \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch Gmail account: {}", e)))?;

        row.map(ConnectedAccount::try_from).transpose()
    }

    /// Soft-delete: the account stays for audit, fetchers stop using it
    pub async fn deactivate(&self, restaurant_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE connected_accounts \
             SET is_active = FALSE, updated_at = NOW() \
             WHERE id = ? AND restaurant_id = ?",
        )
        .bind(id)
        .bind(restaurant_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to deactivate account: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
