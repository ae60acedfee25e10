use actix_web::{http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;
use order_engine::{
    db_types::{Money, NewUser, NewVariant, ShippingDetails, User, Variant},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    CatalogManagement,
    SqliteDatabase,
};
use serde_json::{json, Value};

use crate::server::json_config;

pub async fn setup_db() -> SqliteDatabase {
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
    ShippingDetails::new("Tran Thi B", "0912345678", "45 Nguyen Hue, Quan 1, TP HCM")
}

pub fn shipping_json() -> Value {
    json!({ "recipient_name": "Tran Thi B", "phone": "0912345678", "address": "45 Nguyen Hue, Quan 1, TP HCM" })
}

/// Sends `req` to an app configured by `configure` and returns the status code and body.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(json_config()).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}
