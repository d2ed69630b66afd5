use actix_web::{web, HttpResponse, ResponseError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;

use crate::core::{AppError, Result};
use crate::modules::connectors::models::{AccountKind, ConnectedAccount};
use crate::modules::connectors::repositories::AccountRepository;

/// Request body for connecting a new data source
#[derive(Debug, Deserialize)]
pub struct CreateConnectorRequest {
    pub kind: AccountKind,
    pub label: String,
    pub branch_code: Option<String>,
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    pub access_token: Option<String>,
}

/// Connector representation returned to the dashboard. Credentials are
/// write-only: they never appear in responses.
#[derive(Debug, Serialize)]
pub struct ConnectorResponse {
    pub id: String,
    pub kind: AccountKind,
    pub label: String,
    pub branch_code: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<ConnectedAccount> for ConnectorResponse {
    fn from(account: ConnectedAccount) -> Self {
        Self {
            id: account.id,
            kind: account.kind,
            label: account.label,
            branch_code: account.branch_code,
            is_active: account.is_active,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// GET /connectors
pub async fn list_connectors(
    pool: web::Data<MySqlPool>,
    restaurant_id: web::ReqData<String>,
) -> HttpResponse {
    let repo = AccountRepository::new(pool.get_ref().clone());

    match repo.list_for_restaurant(&restaurant_id).await {
        Ok(accounts) => {
            let response: Vec<ConnectorResponse> =
                accounts.into_iter().map(ConnectorResponse::from).collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            error!("Failed to list connectors: {}", e);
            e.error_response()
        }
    }
}

/// POST /connectors
pub async fn create_connector(
    pool: web::Data<MySqlPool>,
    restaurant_id: web::ReqData<String>,
    body: web::Json<CreateConnectorRequest>,
) -> HttpResponse {
    match handle_create_connector(pool, restaurant_id.into_inner(), body.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            error!("Failed to create connector: {}", e);
            e.error_response()
        }
    }
}

async fn handle_create_connector(
    pool: web::Data<MySqlPool>,
    restaurant_id: String,
    request: CreateConnectorRequest,
) -> Result<ConnectorResponse> {
    let now = Utc::now();
    let account = ConnectedAccount {
        id: String::new(),
        restaurant_id,
        kind: request.kind,
        label: request.label,
        branch_code: request.branch_code,
        api_key: request.api_key,
        api_token: request.api_token,
        access_token: request.access_token,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let repo = AccountRepository::new(pool.get_ref().clone());
    let created = repo.create(&account).await?;

    Ok(ConnectorResponse::from(created))
}

/// DELETE /connectors/{id}
pub async fn deactivate_connector(
    pool: web::Data<MySqlPool>,
    restaurant_id: web::ReqData<String>,
    path: web::Path<String>,
) -> HttpResponse {
    let repo = AccountRepository::new(pool.get_ref().clone());
    let id = path.into_inner();

    match repo.deactivate(&restaurant_id, &id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => AppError::not_found(format!("Connector '{}'", id)).error_response(),
        Err(e) => {
            error!("Failed to deactivate connector: {}", e);
            e.error_response()
        }
    }
}

/// Configure routes for the connectors module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/connectors")
            .route("", web::get().to(list_connectors))
            .route("", web::post().to(create_connector))
            .route("/{id}", web::delete().to(deactivate_connector)),
    );
}
