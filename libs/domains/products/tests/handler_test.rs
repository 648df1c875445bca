//! Handler tests for the Products domain
//!
//! These drive the product router directly over the in-memory repository:
//! - admin guard on every mutation
//! - required-field validation and error bodies
//! - `null` results for unmatched reads

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_helpers::{ErrorResponse, JwtAuth, JwtConfig};
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

struct TestApp {
    router: Router,
    admin_token: String,
    user_token: String,
}

impl TestApp {
    fn new() -> Self {
        let auth = JwtAuth::new(
            &JwtConfig::new("handler-test-secret-at-least-32-characters").unwrap(),
        );
        let service = ProductService::new(InMemoryProductRepository::new());

        Self {
            router: handlers::router(service, &auth),
            admin_token: auth
                .issue_token(Uuid::now_v7(), "admin@shop.test", "admin")
                .unwrap(),
            user_token: auth
                .issue_token(Uuid::now_v7(), "user@shop.test", "user")
                .unwrap(),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_string(&json).unwrap())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn create_mouse(&self) -> Product {
        let response = self
            .send("POST", "/create", Some(&self.admin_token), Some(mouse()))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created: ProductMessage = json_body(response.into_body()).await;
        created.product
    }
}

fn mouse() -> Value {
    json!({
        "name": "Mouse",
        "description": "Wireless optical mouse",
        "price": 25,
        "image": ["mouse-front.png", "mouse-side.png"],
        "stock": 10,
        "productCode": "MS-01"
    })
}

#[tokio::test]
async fn test_admin_creates_product() {
    let app = TestApp::new();

    let response = app
        .send("POST", "/create", Some(&app.admin_token), Some(mouse()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: ProductMessage = json_body(response.into_body()).await;
    assert_eq!(body.message, "Product created successfully");
    assert_eq!(body.product.id, 1);
    assert_eq!(body.product.product_code, "MS-01");
    assert_eq!(
        body.product.image,
        Some(vec![
            "mouse-front.png".to_string(),
            "mouse-side.png".to_string()
        ])
    );
}

#[tokio::test]
async fn test_create_missing_field_is_rejected() {
    for field in ["name", "description", "price", "stock", "productCode"] {
        let app = TestApp::new();
        let mut body = mouse();
        body.as_object_mut().unwrap().remove(field);

        let response = app
            .send("POST", "/create", Some(&app.admin_token), Some(body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "missing {field}");

        let error: ErrorResponse = json_body(response.into_body()).await;
        assert_eq!(error.message, "All fields are required");

        // Nothing persisted
        let response = app.send("GET", "/all", None, None).await;
        let products: Vec<Product> = json_body(response.into_body()).await;
        assert!(products.is_empty());
    }
}

#[tokio::test]
async fn test_create_with_null_field_is_rejected() {
    let app = TestApp::new();
    let mut body = mouse();
    body["description"] = Value::Null;

    let response = app
        .send("POST", "/create", Some(&app.admin_token), Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_zero_price_or_stock_is_rejected() {
    for field in ["price", "stock"] {
        let app = TestApp::new();
        let mut body = mouse();
        body[field] = json!(0);

        let response = app
            .send("POST", "/create", Some(&app.admin_token), Some(body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "zero {field}");

        let error: ErrorResponse = json_body(response.into_body()).await;
        assert_eq!(error.message, "All fields are required");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/create")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["message"].is_string());
    assert!(body["errorStack"].is_string());
}

#[tokio::test]
async fn test_mutations_require_authentication() {
    let app = TestApp::new();
    let product = app.create_mouse().await;
    let id_path = format!("/{}", product.id);
    let stock_path = format!("/stock/{}", product.id);

    let cases = [
        ("POST", "/create", Some(mouse())),
        ("PUT", id_path.as_str(), Some(json!({ "price": 1 }))),
        ("DELETE", id_path.as_str(), None),
        ("PUT", stock_path.as_str(), Some(json!({ "stock": 0 }))),
        ("PATCH", stock_path.as_str(), Some(json!({ "delta": -1 }))),
    ];

    for (method, uri, body) in cases {
        let response = app.send(method, uri, None, body.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

        let response = app.send(method, uri, Some(&app.user_token), body).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method} {uri}");
    }

    // Data unchanged
    let response = app.send("GET", &id_path, None, None).await;
    let stored: Option<Product> = json_body(response.into_body()).await;
    assert_eq!(stored, Some(product));
}

#[tokio::test]
async fn test_reads_are_public() {
    let app = TestApp::new();
    let product = app.create_mouse().await;

    let response = app.send("GET", "/all", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let all: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(all, vec![product.clone()]);

    let response = app.send("GET", "/product-code/MS-01", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let by_code: Option<Product> = json_body(response.into_body()).await;
    assert_eq!(by_code, Some(product));
}

#[tokio::test]
async fn test_unmatched_reads_return_null() {
    let app = TestApp::new();

    for uri in ["/999", "/abc", "/product-code/NOPE"] {
        let response = app.send("GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");

        let body: Value = json_body(response.into_body()).await;
        assert!(body.is_null(), "{uri}");
    }
}

#[tokio::test]
async fn test_id_with_trailing_text_reads_leading_number() {
    let app = TestApp::new();
    let product = app.create_mouse().await;

    for uri in [format!("/{}abc", product.id), format!("/{}.5", product.id)] {
        let response = app.send("GET", &uri, None, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");

        let body: Option<Product> = json_body(response.into_body()).await;
        assert_eq!(body.as_ref(), Some(&product), "{uri}");
    }
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let app = TestApp::new();
    let product = app.create_mouse().await;

    let response = app
        .send(
            "PUT",
            &format!("/{}", product.id),
            Some(&app.admin_token),
            Some(json!({ "price": 30, "image": [] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ProductMessage = json_body(response.into_body()).await;
    assert_eq!(body.message, "Product updated successfully");
    assert_eq!(body.product.price, 30);
    assert_eq!(body.product.name, "Mouse");
    assert_eq!(body.product.stock, 10);
    assert_eq!(body.product.image, None);
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let app = TestApp::new();

    let response = app
        .send(
            "PUT",
            "/42",
            Some(&app.admin_token),
            Some(json!({ "name": "Keyboard" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.message, "Product not found");
}

#[tokio::test]
async fn test_duplicate_product_code_is_conflict() {
    let app = TestApp::new();
    app.create_mouse().await;

    let response = app
        .send("POST", "/create", Some(&app.admin_token), Some(mouse()))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_stock() {
    let app = TestApp::new();
    let product = app.create_mouse().await;
    let uri = format!("/stock/{}", product.id);

    let response = app
        .send("PUT", &uri, Some(&app.admin_token), Some(json!({ "stock": 3 })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ProductMessage = json_body(response.into_body()).await;
    assert_eq!(body.message, "Product stock updated successfully");
    assert_eq!(body.product.stock, 3);

    let response = app
        .send("PUT", &uri, Some(&app.admin_token), Some(json!({ "stock": -1 })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send("PUT", "/stock/42", Some(&app.admin_token), Some(json!({ "stock": 1 })))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_adjust_stock_below_zero_is_conflict() {
    let app = TestApp::new();
    let product = app.create_mouse().await;
    let uri = format!("/stock/{}", product.id);

    let response = app
        .send("PATCH", &uri, Some(&app.admin_token), Some(json!({ "delta": -4 })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ProductMessage = json_body(response.into_body()).await;
    assert_eq!(body.product.stock, 6);

    let response = app
        .send("PATCH", &uri, Some(&app.admin_token), Some(json!({ "delta": -7 })))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.send("GET", &format!("/{}", product.id), None, None).await;
    let stored: Option<Product> = json_body(response.into_body()).await;
    assert_eq!(stored.unwrap().stock, 6);
}

#[tokio::test]
async fn test_adjust_stock_past_i32_is_bad_request() {
    let app = TestApp::new();
    let product = app.create_mouse().await;
    let uri = format!("/stock/{}", product.id);

    let response = app
        .send(
            "PATCH",
            &uri,
            Some(&app.admin_token),
            Some(json!({ "delta": i32::MAX })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.message, "stock out of range");

    let response = app.send("GET", &format!("/{}", product.id), None, None).await;
    let stored: Option<Product> = json_body(response.into_body()).await;
    assert_eq!(stored.unwrap().stock, 10);
}

#[tokio::test]
async fn test_delete_twice() {
    let app = TestApp::new();
    let product = app.create_mouse().await;
    let uri = format!("/{}", product.id);

    let response = app.send("DELETE", &uri, Some(&app.admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Product deleted successfully");

    let response = app.send("DELETE", &uri, Some(&app.admin_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
