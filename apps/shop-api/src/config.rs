//! Configuration for the Shop API

use axum::http::HeaderValue;
use axum_helpers::{JwtConfig, parse_allowed_origins};
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_optional, env_or_default, env_parse_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    /// Empty means any origin (development)
    pub cors_origins: Vec<HeaderValue>,
    pub run_migrations: bool,
    pub admin_seed: Option<AdminSeed>,
}

/// Bootstrap admin account created at startup when absent.
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminSeed {
    /// `ADMIN_EMAIL` and `ADMIN_PASSWORD` must both be set; `ADMIN_NAME` defaults to "Admin".
    fn from_env() -> Option<Self> {
        match (env_optional("ADMIN_EMAIL"), env_optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(Self {
                name: env_or_default("ADMIN_NAME", "Admin"),
                email,
                password,
            }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must both be set, skipping admin seed"
                );
                None
            }
            (None, None) => None,
        }
    }
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        let cors_origins = match env_optional("CORS_ALLOWED_ORIGIN") {
            Some(raw) => parse_allowed_origins(&raw).map_err(|details| ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details,
            })?,
            None => Vec::new(),
        };

        let run_migrations = env_parse_or_default("RUN_MIGRATIONS", "false")?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            jwt,
            cors_origins,
            run_migrations,
            admin_seed: AdminSeed::from_env(),
        })
    }
}
