use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Product with code '{0}' already exists")]
    DuplicateProductCode(String),

    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => AppError::NotFound("Product not found".to_string()),
            ProductError::MissingFields => {
                AppError::BadRequest("All fields are required".to_string())
            }
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::DuplicateProductCode(code) => {
                AppError::Conflict(format!("Product with code '{}' already exists", code))
            }
            ProductError::InsufficientStock {
                available,
                requested,
            } => AppError::Conflict(format!(
                "Insufficient stock: {} available, {} requested",
                available, requested
            )),
            ProductError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProductError::NotFound, StatusCode::NOT_FOUND),
            (ProductError::MissingFields, StatusCode::BAD_REQUEST),
            (
                ProductError::Validation("price must not be negative".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::DuplicateProductCode("MS-01".into()),
                StatusCode::CONFLICT,
            ),
            (
                ProductError::InsufficientStock {
                    available: 1,
                    requested: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                ProductError::Database(DbErr::Custom("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_messages_match_client_contract() {
        assert_eq!(AppError::from(ProductError::NotFound).message(), "Product not found");
        assert_eq!(
            AppError::from(ProductError::MissingFields).message(),
            "All fields are required"
        );
    }
}
