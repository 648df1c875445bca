//! Shop API - product catalogue and user accounts over REST
//!
//! The binary in `main.rs` wires PostgreSQL repositories into [`build_app`];
//! tests pass in-memory ones.

use axum::{Router, http::HeaderValue};
use axum_helpers::{JwtAuth, create_router, health_router};
use core_config::AppInfo;
use domain_products::{ProductRepository, ProductService};
use domain_users::{UserRepository, UserService};

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

/// Full HTTP app: versioned API under `/api/v1`, docs UIs, `/health`, and the
/// JSON 404 fallback. `extra` holds further top-level routes such as `/ready`;
/// they sit behind the same layers as the rest.
pub fn build_app<P, U>(
    products: ProductService<P>,
    users: UserService<U>,
    auth: &JwtAuth,
    extra: Router,
    cors_origins: Vec<HeaderValue>,
    app_info: AppInfo,
) -> Router
where
    P: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    let api_routes = api::routes(products, users, auth);
    let root = health_router(app_info).merge(extra);

    create_router::<openapi::ApiDoc>(api_routes, root, cors_origins)
}
