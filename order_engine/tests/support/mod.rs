#![allow(dead_code)]
use order_engine::{
    db_types::{Money, NewUser, NewVariant, ShippingDetails, User, Variant},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    CatalogManagement,
    SqliteDatabase,
};

pub async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn seed_user(db: &SqliteDatabase, username: &str) -> User {
    let email = format!("{username}@example.com");
    db.insert_user(NewUser::new(username, email.as_str())).await.expect("Error creating user")
}

pub async fn seed_variant(db: &SqliteDatabase, sku: &str, price: i64, stock: i64) -> Variant {
    let product = db.insert_product(&format!("Product {sku}")).await.expect("Error creating product");
    db.insert_variant(NewVariant::new(product.id, sku, Money::from(price), stock))
        .await
        .expect("Error creating variant")
}

pub async fn stock_of(db: &SqliteDatabase, variant_id: i64) -> i64 {
    db.find_variant(variant_id).await.expect("Error fetching variant").expect("Variant should exist").stock
}

pub fn shipping() -> ShippingDetails {
    ShippingDetails::new("Nguyen Van A", "0901234567", "12 Ly Thuong Kiet, Hoan Kiem, Ha Noi").with_note("Call first")
}
