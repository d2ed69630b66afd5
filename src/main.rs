use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platewise::config::Config;
use platewise::middleware::{ApiKeyAuth, RequestId};
use platewise::modules::{connectors, costing, health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platewise=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting PlateWise Restaurant Cost Analytics");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let allowed_origin = config.security.allowed_origin.clone();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec!["Content-Type", "X-API-Key", "X-Request-ID"])
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(ApiKeyAuth::new(db_pool.clone()))
            .wrap(RequestId)
            .wrap(cors)
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .route("/", web::get().to(index))
            .configure(health::controllers::configure)
            .configure(connectors::controllers::configure)
            .configure(costing::controllers::configure)
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "PlateWise Restaurant Cost Analytics",
        "version": "0.1.0",
        "status": "running"
    }))
}
