//! Shop API - REST server

use axum_helpers::{JwtAuth, create_production_app, init_error_reporting};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use domain_products::{PgProductRepository, ProductService};
use domain_users::{PostgresUserRepository, UserService};
use shop_api::{
    api, build_app,
    config::{Config, Environment},
    state::AppState,
};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation
    install_color_eyre();

    // Tracing first so configuration warnings are not lost
    let environment = Environment::from_env();
    init_tracing(&environment);
    init_error_reporting(&environment);

    let config = Config::from_env()?;

    let db = database::postgres::connect_with_retry(config.database.clone(), RetryConfig::new())
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }

    let auth = JwtAuth::new(&config.jwt).with_secure_cookies(config.environment.use_https());
    let products = ProductService::new(PgProductRepository::new(db.clone()));
    let users = UserService::new(PostgresUserRepository::new(db.clone()));

    if let Some(seed) = &config.admin_seed {
        let created = users
            .ensure_admin(&seed.name, &seed.email, &seed.password)
            .await
            .map_err(|e| eyre::eyre!("Admin seeding failed: {}", e))?;
        if created {
            info!(email = %seed.email, "Admin account created");
        }
    }

    let state = AppState { config, db };

    let app = build_app(
        products,
        users,
        &auth,
        api::ready_router(state.clone()),
        state.config.cors_origins.clone(),
        state.config.app,
    );

    info!(
        environment = ?state.config.environment,
        "Starting Shop API with graceful shutdown (30s timeout)"
    );

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match state.db.close().await {
                Ok(()) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Shop API shutdown complete");
    Ok(())
}
