use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, JsonBody, JwtAuth, admin_only,
    errors::responses::{
        BadRequestResponse, ConflictResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::fmt::Display;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, MessageResponse, Product, ProductMessage, StockAdjustment, StockUpdate,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "Products";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        list_products,
        get_product,
        get_product_by_code,
        update_product,
        delete_product,
        update_stock,
        adjust_stock,
    ),
    components(
        schemas(
            Product,
            CreateProduct,
            UpdateProduct,
            StockUpdate,
            StockAdjustment,
            ProductMessage,
            MessageResponse
        ),
        responses(
            BadRequestResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalogue and stock endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<ProductService<R>>;

/// Create the product router.
///
/// Reads are public; every mutation goes through [`admin_only`].
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    auth: &JwtAuth,
) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/create", admin_only(auth, post(create_product::<R>)))
        .route("/all", get(list_products::<R>))
        .route(
            "/{id}",
            get(get_product::<R>).merge(admin_only(
                auth,
                put(update_product::<R>).delete(delete_product::<R>),
            )),
        )
        .route("/product-code/{product_code}", get(get_product_by_code::<R>))
        .route(
            "/stock/{id}",
            admin_only(auth, put(update_stock::<R>).patch(adjust_stock::<R>)),
        )
        .with_state(shared_service)
}

fn audit(admin: &AuthUser, headers: &HeaderMap, action: &str, product_id: impl Display) {
    AuditEvent::new(action, AuditOutcome::Success)
        .actor(admin.id)
        .resource(format!("product:{product_id}"))
        .from_headers(headers)
        .log();
}

/// Create a product
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body = CreateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created", body = ProductMessage),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    JsonBody(input): JsonBody<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    audit(&admin, &headers, "product.create", product.id);

    Ok((
        StatusCode::CREATED,
        Json(ProductMessage::new("Product created successfully", product)),
    ))
}

/// List every product, ordered by id
#[utoipa::path(
    get,
    path = "/all",
    tag = TAG,
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<SharedService<R>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by id; `null` when there is no match
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "The product, or null", body = Option<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Option<Product>>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product))
}

/// Get a product by its product code; `null` when there is no match
#[utoipa::path(
    get,
    path = "/product-code/{product_code}",
    tag = TAG,
    params(
        ("product_code" = String, Path, description = "Product code, e.g. MS-01")
    ),
    responses(
        (status = 200, description = "The product, or null", body = Option<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product_by_code<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    Path(product_code): Path<String>,
) -> ProductResult<Json<Option<Product>>> {
    let product = service.get_product_by_code(&product_code).await?;
    Ok(Json(product))
}

/// Update a product's descriptive fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product id")
    ),
    request_body = UpdateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = ProductMessage),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateProduct>,
) -> ProductResult<Json<ProductMessage>> {
    let product = service.update_product(&id, input).await?;
    audit(&admin, &headers, "product.update", product.id);

    Ok(Json(ProductMessage::new(
        "Product updated successfully",
        product,
    )))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProductResult<Json<MessageResponse>> {
    service.delete_product(&id).await?;
    audit(&admin, &headers, "product.delete", &id);

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

/// Overwrite a product's stock level
#[utoipa::path(
    put,
    path = "/stock/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product id")
    ),
    request_body = StockUpdate,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stock updated", body = ProductMessage),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_stock<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StockUpdate>,
) -> ProductResult<Json<ProductMessage>> {
    let product = service.update_stock(&id, input).await?;
    audit(&admin, &headers, "product.stock.set", product.id);

    Ok(Json(ProductMessage::new(
        "Product stock updated successfully",
        product,
    )))
}

/// Add or remove units; never drives stock below zero
#[utoipa::path(
    patch,
    path = "/stock/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product id")
    ),
    request_body = StockAdjustment,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stock adjusted", body = ProductMessage),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn adjust_stock<R: ProductRepository>(
    State(service): State<SharedService<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StockAdjustment>,
) -> ProductResult<Json<ProductMessage>> {
    let product = service.adjust_stock(&id, input).await?;
    audit(&admin, &headers, "product.stock.adjust", product.id);

    Ok(Json(ProductMessage::new(
        "Product stock updated successfully",
        product,
    )))
}
