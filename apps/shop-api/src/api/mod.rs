use axum::{Router, routing::get};
use axum_helpers::JwtAuth;
use domain_products::{ProductRepository, ProductService};
use domain_users::{UserRepository, UserService};

use crate::state::AppState;

pub mod health;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes<P, U>(products: ProductService<P>, users: UserService<U>, auth: &JwtAuth) -> Router
where
    P: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .nest("/v1/products", domain_products::handlers::router(products, auth))
        .nest("/v1/users", domain_users::handlers::router(users, auth))
}

/// `/ready` needs the pool, so it carries its own state; pass it to `build_app` as an extra route.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
