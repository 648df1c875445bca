use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{NewProduct, Product};

/// Sea-ORM Entity for the product table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    pub stock: i32,
    #[sea_orm(column_name = "productCode", unique)]
    pub product_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            image: split_images(model.image),
            stock: model.stock,
            product_code: model.product_code,
        }
    }
}

impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            image: Set(join_images(input.image)),
            stock: Set(input.stock),
            product_code: Set(input.product_code),
        }
    }
}

pub(crate) fn join_images(images: Option<Vec<String>>) -> Option<String> {
    images
        .filter(|images| !images.is_empty())
        .map(|images| images.join(","))
}

fn split_images(column: Option<String>) -> Option<Vec<String>> {
    column
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw.split(',').map(str::to_string).collect())
}
