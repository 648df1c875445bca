//! Integration tests for the Products domain
//!
//! These use real PostgreSQL via testcontainers to check:
//! - the entity matches the migrated `product` table
//! - the `productCode` unique constraint surfaces as a conflict
//! - the conditional stock update never goes negative
//!
//! Docker is required, so they are ignored by default:
//! `cargo test -p domain_products -- --ignored`

use domain_products::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::assert_some};

fn new_product(builder: &TestDataBuilder, suffix: &str) -> NewProduct {
    NewProduct {
        name: builder.name("product", suffix),
        description: "Integration test product".to_string(),
        price: 25,
        image: Some(vec!["front.png".to_string(), "side.png".to_string()]),
        stock: 10,
        product_code: builder.product_code(suffix),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_fetch_by_code() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_fetch");

    let input = new_product(&builder, "mouse");
    let created = repo.create(input.clone()).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.image, input.image);

    let fetched = repo.get_by_code(&input.product_code).await.unwrap();
    let fetched = assert_some(fetched, "product should exist");
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_product_code_constraint() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_code");

    repo.create(new_product(&builder, "mouse")).await.unwrap();
    let result = repo.create(new_product(&builder, "mouse")).await;

    assert!(matches!(result, Err(ProductError::DuplicateProductCode(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_is_ordered_by_id() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("list_order");

    let first = repo.create(new_product(&builder, "a")).await.unwrap();
    let second = repo.create(new_product(&builder, "b")).await.unwrap();

    let ids: Vec<i32> = repo.list().await.unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_partial_update_and_image_clear() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("partial_update");

    let created = repo.create(new_product(&builder, "mouse")).await.unwrap();
    let update = UpdateProduct {
        price: Some(40),
        image: Some(vec![]),
        ..Default::default()
    };

    let updated = repo.update(created.id, update).await.unwrap();
    assert_eq!(updated.price, 40);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.image, None);

    let missing = repo.update(created.id + 1000, UpdateProduct::default()).await;
    assert!(matches!(missing, Err(ProductError::NotFound)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_stock_operations() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("stock_ops");

    let created = repo.create(new_product(&builder, "mouse")).await.unwrap();

    let set = repo.set_stock(created.id, 3).await.unwrap();
    assert_eq!(set.stock, 3);

    let adjusted = repo.adjust_stock(created.id, -2).await.unwrap();
    assert_eq!(adjusted.stock, 1);

    let result = repo.adjust_stock(created.id, -5).await;
    assert!(matches!(
        result,
        Err(ProductError::InsufficientStock {
            available: 1,
            requested: 5
        })
    ));

    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 1);

    assert!(matches!(
        repo.adjust_stock(created.id + 1000, 1).await,
        Err(ProductError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_adjust_stock_past_i32_is_out_of_range() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("stock_overflow");

    let created = repo.create(new_product(&builder, "mouse")).await.unwrap();

    let result = repo.adjust_stock(created.id, i32::MAX).await;
    match result {
        Err(ProductError::Validation(msg)) => assert_eq!(msg, "stock out of range"),
        other => panic!("expected out of range, got {other:?}"),
    }

    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, created.stock);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_decrements_never_oversell() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("concurrent_decrement");

    let created = repo.create(new_product(&builder, "mouse")).await.unwrap();

    // 10 in stock, 15 buyers of one unit each
    let tasks: Vec<_> = (0..15)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.adjust_stock(created.id, -1).await })
        })
        .collect();

    let mut sold = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            sold += 1;
        }
    }

    assert_eq!(sold, 10);
    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_twice() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("delete_twice");

    let created = repo.create(new_product(&builder, "mouse")).await.unwrap();

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
}
