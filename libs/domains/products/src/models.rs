use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ProductError, ProductResult};

/// Catalogue item as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Whole currency units
    pub price: i32,
    /// Image URLs in display order
    pub image: Option<Vec<String>>,
    /// Units available
    pub stock: i32,
    pub product_code: String,
}

/// Body of `POST /create`.
///
/// Every field is optional on the wire so a missing one can be reported as
/// "All fields are required" instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[schema(example = "Mouse")]
    pub name: Option<String>,
    #[schema(example = "Wireless optical mouse")]
    pub description: Option<String>,
    #[schema(example = 25)]
    pub price: Option<i32>,
    pub image: Option<Vec<String>>,
    #[schema(example = 10)]
    pub stock: Option<i32>,
    #[schema(example = "MS-01")]
    pub product_code: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i32,
    pub image: Option<Vec<String>>,
    pub stock: i32,
    pub product_code: String,
}

impl TryFrom<CreateProduct> for NewProduct {
    type Error = ProductError;

    fn try_from(input: CreateProduct) -> ProductResult<Self> {
        let (Some(name), Some(description), Some(price), Some(stock), Some(product_code)) = (
            present(input.name),
            present(input.description),
            input.price.filter(|v| *v != 0),
            input.stock.filter(|v| *v != 0),
            present(input.product_code),
        ) else {
            return Err(ProductError::MissingFields);
        };

        non_negative("price", price)?;
        non_negative("stock", stock)?;

        Ok(Self {
            name,
            description,
            price,
            image: normalize_images(input.image)?,
            stock,
            product_code,
        })
    }
}

/// Body of `PUT /{id}`. Absent fields keep their stored value.
///
/// `stock` is not part of it; stock has its own endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i32>,
    /// `[]` removes all images
    pub image: Option<Vec<String>>,
    pub product_code: Option<String>,
}

impl UpdateProduct {
    /// Apply the same rules as create to the fields that are present.
    ///
    /// Strings are trimmed and an empty image list becomes `Some(vec![])`.
    pub fn validated(self) -> ProductResult<Self> {
        let name = required_if_present("name", self.name)?;
        let description = required_if_present("description", self.description)?;
        let product_code = required_if_present("productCode", self.product_code)?;
        if let Some(price) = self.price {
            non_negative("price", price)?;
        }
        let image = match self.image {
            Some(images) => Some(normalize_images(Some(images))?.unwrap_or_default()),
            None => None,
        };

        Ok(Self {
            name,
            description,
            price: self.price,
            image,
            product_code,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.product_code.is_none()
    }
}

impl Product {
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(images) = update.image {
            self.image = (!images.is_empty()).then_some(images);
        }
        if let Some(product_code) = update.product_code {
            self.product_code = product_code;
        }
    }
}

/// Body of `PUT /stock/{id}`: overwrite the stock level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StockUpdate {
    #[schema(example = 3)]
    pub stock: Option<i32>,
}

impl StockUpdate {
    pub fn validated(self) -> ProductResult<i32> {
        let stock = self
            .stock
            .ok_or_else(|| ProductError::Validation("stock is required".to_string()))?;
        non_negative("stock", stock)?;
        Ok(stock)
    }
}

/// Body of `PATCH /stock/{id}`: add (or, when negative, remove) units.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StockAdjustment {
    #[schema(example = -1)]
    pub delta: Option<i32>,
}

impl StockAdjustment {
    pub fn validated(self) -> ProductResult<i32> {
        self.delta
            .ok_or_else(|| ProductError::Validation("delta is required".to_string()))
    }
}

/// `{message, product}` envelope of successful mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductMessage {
    #[schema(example = "Product created successfully")]
    pub message: String,
    pub product: Product,
}

impl ProductMessage {
    pub fn new(message: &str, product: Product) -> Self {
        Self {
            message: message.to_string(),
            product,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_if_present(field: &str, value: Option<String>) -> ProductResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => present(Some(v))
            .map(Some)
            .ok_or_else(|| ProductError::Validation(format!("{field} must not be empty"))),
    }
}

fn non_negative(field: &str, value: i32) -> ProductResult<()> {
    if value < 0 {
        return Err(ProductError::Validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

/// Images are stored comma-joined, so an entry may not contain a comma.
/// Blank entries are dropped; an empty list becomes `None`.
fn normalize_images(images: Option<Vec<String>>) -> ProductResult<Option<Vec<String>>> {
    let Some(images) = images else {
        return Ok(None);
    };

    let images: Vec<String> = images
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();

    if images.iter().any(|i| i.contains(',')) {
        return Err(ProductError::Validation(
            "image entries must not contain commas".to_string(),
        ));
    }

    Ok((!images.is_empty()).then_some(images))
}
