//! # Axum Helpers
//!
//! Shared HTTP plumbing for the shop backend.
//!
//! ## Modules
//!
//! - **[`errors`]**: `AppError`, the centralized error responder (`{message, errorStack}` bodies)
//! - **[`auth`]**: stateless JWT, `require_auth` / `require_admin` middleware, `AuthUser`
//! - **[`extractors`]**: JSON and UUID extractors that reject through `AppError`
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly with OpenAPI UIs, health/readiness, graceful shutdown
//! - **[`audit`]**: audit events on the `audit` tracing target

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    ADMIN_ROLE, AuthUser, JwtAuth, JwtClaims, JwtConfig, admin_only, authenticated, require_admin,
    require_auth,
};

pub use server::{
    HealthCheckFuture, HealthResponse, create_production_app, create_router, health_router,
    run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, create_permissive_cors_layer, parse_allowed_origins, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse, init_error_reporting};

pub use extractors::{JsonBody, UuidPath};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
