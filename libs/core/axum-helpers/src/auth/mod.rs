//! Stateless JWT authentication and role checks.
//!
//! - [`JwtAuth`] issues and verifies HS256 tokens and builds the `access_token` cookie
//! - [`require_auth`] resolves the principal from a Bearer header or the cookie
//! - [`require_admin`] rejects principals whose role is not `admin`
//!
//! # Example
//!
//! ```ignore
//! use axum::routing::{get, post};
//! use axum_helpers::auth::{admin_only, JwtAuth, JwtConfig};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let router = Router::new()
//!     .route("/all", get(list))
//!     .route("/create", admin_only(&auth, post(create)));
//! ```

pub mod config;
pub mod cookie;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use cookie::ACCESS_TOKEN_COOKIE;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{
    ADMIN_ROLE, AuthUser, admin_only, authenticated, extract_token_from_request, require_admin,
    require_auth,
};
