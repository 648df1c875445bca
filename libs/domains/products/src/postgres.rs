use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, SqlErr, Statement,
};

use crate::{
    entity::{self, join_images},
    error::{ProductError, ProductResult},
    models::{NewProduct, Product, UpdateProduct},
    repository::ProductRepository,
};

/// PostgreSQL implementation of ProductRepository using SeaORM
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Run a `... RETURNING *` statement against the product table.
    async fn returning_one(
        &self,
        sql: &str,
        values: [sea_orm::Value; 2],
    ) -> ProductResult<Option<Product>> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let model = entity::Model::find_by_statement(stmt).one(&self.db).await?;
        Ok(model.map(Product::from))
    }
}

/// Unique violations on `productCode` become a conflict, everything else a database error.
fn map_write_err(err: DbErr, product_code: &str) -> ProductError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ProductError::DuplicateProductCode(product_code.to_string())
        }
        _ => ProductError::Database(err),
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product_code = input.product_code.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, &product_code))?;

        tracing::info!(product_id = model.id, product_code = %model.product_code, "Created product");
        Ok(model.into())
    }

    async fn list(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Product::from))
    }

    async fn get_by_code(&self, product_code: &str) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find()
            .filter(entity::Column::ProductCode.eq(product_code))
            .one(&self.db)
            .await?;

        Ok(model.map(Product::from))
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound)?;

        if input.is_empty() {
            return Ok(model.into());
        }

        let product_code = input
            .product_code
            .clone()
            .unwrap_or_else(|| model.product_code.clone());

        let mut active_model: entity::ActiveModel = model.into();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(description) = input.description {
            active_model.description = Set(description);
        }
        if let Some(price) = input.price {
            active_model.price = Set(price);
        }
        if let Some(images) = input.image {
            active_model.image = Set(join_images(Some(images)));
        }
        if let Some(code) = input.product_code {
            active_model.product_code = Set(code);
        }

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => ProductError::NotFound,
                e => map_write_err(e, &product_code),
            })?;

        tracing::info!(product_id = id, "Updated product");
        Ok(model.into())
    }

    async fn set_stock(&self, id: i32, stock: i32) -> ProductResult<Product> {
        let product = self
            .returning_one(
                "UPDATE product SET stock = $1 WHERE id = $2 RETURNING *",
                [stock.into(), id.into()],
            )
            .await?
            .ok_or(ProductError::NotFound)?;

        tracing::info!(product_id = id, stock, "Set product stock");
        Ok(product)
    }

    async fn adjust_stock(&self, id: i32, delta: i32) -> ProductResult<Product> {
        // Check and write in one statement; concurrent decrements cannot oversell
        let updated = self
            .returning_one(
                "UPDATE product SET stock = stock + $1 \
                 WHERE id = $2 AND stock::bigint + $1 BETWEEN 0 AND 2147483647 \
                 RETURNING *",
                [delta.into(), id.into()],
            )
            .await?;

        match updated {
            Some(product) => {
                tracing::info!(
                    product_id = id,
                    delta,
                    stock = product.stock,
                    "Adjusted product stock"
                );
                Ok(product)
            }
            None => match self.get_by_id(id).await? {
                Some(current) if current.stock.checked_add(delta).is_none() => Err(
                    ProductError::Validation("stock out of range".to_string()),
                ),
                Some(current) => Err(ProductError::InsufficientStock {
                    available: current.stock,
                    requested: delta.saturating_neg(),
                }),
                None => Err(ProductError::NotFound),
            },
        }
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        let deleted = result.rows_affected > 0;

        if deleted {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }
}
