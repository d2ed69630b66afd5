use crate::core::AppError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use futures_util::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use sqlx::MySqlPool;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Dashboard API key authentication middleware
pub struct ApiKeyAuth {
    pool: MySqlPool,
}

impl ApiKeyAuth {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            pool: self.pool.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    pool: MySqlPool,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            // Health probes and the index stay public
            let path = req.path();
            if path == "/health" || path == "/ready" || path == "/" {
                return svc.call(req).await;
            }

            // Extract API key from X-API-Key header
            let api_key = req
                .headers()
                .get("X-API-Key")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing X-API-Key header")))?;

            let api_key_record = validate_api_key(&pool, api_key).await.map_err(Error::from)?;

            // Handlers read the restaurant scope out of request extensions
            req.extensions_mut()
                .insert(api_key_record.restaurant_id.clone());
            req.extensions_mut().insert(api_key_record);

            svc.call(req).await
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiKeyRecord {
    pub id: String,
    pub restaurant_id: String,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ApiKeyRow {
    id: String,
    restaurant_id: String,
    is_active: bool,
    key_hash: String,
}

async fn validate_api_key(pool: &MySqlPool, api_key: &str) -> crate::core::Result<ApiKeyRecord> {
    // The argon2 hash is salted and cannot be queried by equality, so rows
    // carry a deterministic SHA-256 digest for lookup. The digest narrows
    // to one candidate; the salted hash still decides.
    let row = sqlx::query_as::<_, ApiKeyRow>(
        r#"
        SELECT id, restaurant_id, is_active, key_hash
        FROM api_keys
        WHERE key_digest = ? AND is_active = TRUE
        LIMIT 1
        "#,
    )
    .bind(digest_api_key(api_key))
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::unauthorized("Invalid API key"))?;

    if !verify_api_key(api_key, &row.key_hash)? {
        return Err(AppError::unauthorized("Invalid API key"));
    }

    // Update last_used_at timestamp (fire and forget)
    let _ = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = ?")
        .bind(&row.id)
        .execute(pool)
        .await;

    Ok(ApiKeyRecord {
        id: row.id,
        restaurant_id: row.restaurant_id,
        is_active: row.is_active,
    })
}

/// Deterministic lookup digest stored alongside the argon2 hash
pub fn digest_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

/// Hash an API key with Argon2 before persisting it
pub fn hash_api_key(api_key: &str) -> crate::core::Result<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
        Argon2,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(api_key.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash API key: {}", e)))
}

/// Verify an API key against a stored Argon2 hash
pub fn verify_api_key(api_key: &str, hash: &str) -> crate::core::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(api_key.as_bytes(), &parsed_hash)
        .is_ok())
}
