//! Reusable OpenAPI response types for the error body.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "message": "Internal server error",
        "errorStack": ""
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - missing or invalid fields",
    content_type = "application/json",
    example = json!({
        "message": "All fields are required",
        "errorStack": ""
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "message": "Product not found",
        "errorStack": ""
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unauthorized - missing or invalid token",
    content_type = "application/json",
    example = json!({
        "message": "Unauthorized",
        "errorStack": ""
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Forbidden - admin role required",
    content_type = "application/json",
    example = json!({
        "message": "Forbidden",
        "errorStack": ""
    })
)]
pub struct ForbiddenResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - resource already exists or state does not allow the change",
    content_type = "application/json",
    example = json!({
        "message": "Product code already exists",
        "errorStack": ""
    })
)]
pub struct ConflictResponse(pub ErrorResponse);
