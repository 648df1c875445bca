use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, NewProduct, Product, StockAdjustment, StockUpdate, UpdateProduct,
};
use crate::repository::ProductRepository;

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

/// Path ids arrive as text and are read up to the first non-digit, so `7abc`
/// is 7. No leading digits, or a value outside `i32`, matches no product.
fn parse_id(raw: &str) -> Option<i32> {
    let raw = raw.trim_start();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.strip_prefix('+').unwrap_or(raw)),
    };

    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits == 0 {
        return None;
    }

    format!("{sign}{}", &rest[..digits]).parse().ok()
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Validate and persist a new product
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        let input = NewProduct::try_from(input)?;
        self.repository.create(input).await
    }

    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.list().await
    }

    /// `None` both for an unknown id and for one that is not a number
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Option<Product>> {
        match parse_id(id) {
            Some(id) => self.repository.get_by_id(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_code(&self, product_code: &str) -> ProductResult<Option<Product>> {
        self.repository.get_by_code(product_code).await
    }

    /// Partial update of the descriptive fields
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: &str, input: UpdateProduct) -> ProductResult<Product> {
        let input = input.validated()?;
        let id = parse_id(id).ok_or(ProductError::NotFound)?;

        self.repository.update(id, input).await
    }

    /// Overwrite the stock level
    #[instrument(skip(self, input))]
    pub async fn update_stock(&self, id: &str, input: StockUpdate) -> ProductResult<Product> {
        let stock = input.validated()?;
        let id = parse_id(id).ok_or(ProductError::NotFound)?;

        self.repository.set_stock(id, stock).await
    }

    /// Add or remove units without ever going below zero
    #[instrument(skip(self, input))]
    pub async fn adjust_stock(&self, id: &str, input: StockAdjustment) -> ProductResult<Product> {
        let delta = input.validated()?;
        let id = parse_id(id).ok_or(ProductError::NotFound)?;

        self.repository.adjust_stock(id, delta).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> ProductResult<()> {
        let id = parse_id(id).ok_or(ProductError::NotFound)?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound);
        }
        Ok(())
    }
}
