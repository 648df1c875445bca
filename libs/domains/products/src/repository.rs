use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, UpdateProduct};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product; the id is assigned by the store
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// All products ordered by id
    async fn list(&self) -> ProductResult<Vec<Product>>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    async fn get_by_code(&self, product_code: &str) -> ProductResult<Option<Product>>;

    /// Partial update; `NotFound` when the id does not exist
    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product>;

    /// Overwrite the stock level
    async fn set_stock(&self, id: i32, stock: i32) -> ProductResult<Product>;

    /// Add `delta` to the stock level atomically.
    ///
    /// Fails with `InsufficientStock` and leaves the row unchanged when the
    /// result would be negative.
    async fn adjust_stock(&self, id: i32, delta: i32) -> ProductResult<Product>;

    /// Returns `false` when nothing was deleted
    async fn delete(&self, id: i32) -> ProductResult<bool>;
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i32, Product>,
    last_id: i32,
}

impl Store {
    fn code_taken(&self, product_code: &str, except: Option<i32>) -> bool {
        self.products
            .values()
            .any(|p| p.product_code == product_code && Some(p.id) != except)
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if store.code_taken(&input.product_code, None) {
            return Err(ProductError::DuplicateProductCode(input.product_code));
        }

        store.last_id += 1;
        let product = Product {
            id: store.last_id,
            name: input.name,
            description: input.description,
            price: input.price,
            image: input.image,
            stock: input.stock,
            product_code: input.product_code,
        };
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn list(&self) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn get_by_code(&self, product_code: &str) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store
            .products
            .values()
            .find(|p| p.product_code == product_code)
            .cloned())
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if let Some(code) = &input.product_code {
            if store.code_taken(code, Some(id)) {
                return Err(ProductError::DuplicateProductCode(code.clone()));
            }
        }

        let product = store.products.get_mut(&id).ok_or(ProductError::NotFound)?;
        product.apply_update(input);

        tracing::info!(product_id = id, "Updated product");
        Ok(product.clone())
    }

    async fn set_stock(&self, id: i32, stock: i32) -> ProductResult<Product> {
        let mut store = self.store.write().await;
        let product = store.products.get_mut(&id).ok_or(ProductError::NotFound)?;
        product.stock = stock;

        tracing::info!(product_id = id, stock, "Set product stock");
        Ok(product.clone())
    }

    async fn adjust_stock(&self, id: i32, delta: i32) -> ProductResult<Product> {
        let mut store = self.store.write().await;
        let product = store.products.get_mut(&id).ok_or(ProductError::NotFound)?;

        let stock = product
            .stock
            .checked_add(delta)
            .ok_or_else(|| ProductError::Validation("stock out of range".to_string()))?;
        if stock < 0 {
            return Err(ProductError::InsufficientStock {
                available: product.stock,
                requested: delta.saturating_neg(),
            });
        }
        product.stock = stock;

        tracing::info!(product_id = id, delta, stock, "Adjusted product stock");
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.products.remove(&id).is_some();

        if removed {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(removed)
    }
}
