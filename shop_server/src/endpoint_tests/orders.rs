use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use order_engine::{
    events::EventProducers,
    test_utils::prepare_env::tear_down,
    CartApi,
    SqliteDatabase,
    OrderFlowApi,
};
use serde_json::{json, Value};

use super::helpers::{parse, seed_user, seed_variant, send_request, setup_db, shipping_json, stock_of};
use crate::routes::{
    BuyNowRoute,
    CancelOrderRoute,
    OrderByIdRoute,
    OrderFromCartRoute,
    OrdersForUserRoute,
    UpdateOrderStatusRoute,
};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, EventProducers::default())))
            .service(BuyNowRoute::<SqliteDatabase>::new())
            .service(OrderFromCartRoute::<SqliteDatabase>::new())
            .service(OrdersForUserRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new());
    }
}

fn buy_now_body(user_id: i64, variant_id: i64, quantity: i64) -> Value {
    let mut body = shipping_json();
    body["user_id"] = json!(user_id);
    body["variant_id"] = json!(variant_id);
    body["quantity"] = json!(quantity);
    body
}

async fn set_status(db: &SqliteDatabase, order_id: i64, status: &str) -> (StatusCode, String) {
    let req = TestRequest::put().uri(&format!("/order/{order_id}/status")).set_json(json!({ "status": status }));
    send_request(req, configure(db.clone())).await
}

#[actix_web::test]
async fn buy_now_reserves_stock() {
    let db = setup_db().await;
    let user = seed_user(&db, "alice").await;
    let tee = seed_variant(&db, "TEE-L", 200_000, 5).await;

    let req = TestRequest::post().uri("/orders/buy_now").set_json(buy_now_body(user.id, tee.id, 2));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let order = parse(&body);
    assert_eq!(order["order"]["status"], "Pending");
    assert_eq!(order["order"]["total_amount"], 400_000);
    assert_eq!(order["order"]["recipient_name"], "Tran Thi B");
    assert_eq!(order["details"][0]["subtotal"], 400_000);
    assert_eq!(stock_of(&db, tee.id).await, 3);

    let req = TestRequest::post().uri("/orders/buy_now").set_json(buy_now_body(user.id, tee.id, 4));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(parse(&body)["error"].as_str().is_some_and(|e| e.contains("Not enough stock")));
    assert_eq!(stock_of(&db, tee.id).await, 3);
    tear_down(db).await;
}

#[actix_web::test]
async fn order_from_cart_empties_the_cart() {
    let db = setup_db().await;
    let user = seed_user(&db, "bob").await;
    let cap = seed_variant(&db, "CAP", 150_000, 4).await;
    let carts = CartApi::new(db.clone());
    let cart = carts.add_item(user.id, cap.id, 2).await.unwrap();

    let mut body = shipping_json();
    body["user_id"] = json!(user.id);
    body["cart_id"] = json!(cart.cart.id);
    let req = TestRequest::post().uri("/orders/from_cart").set_json(body.clone());
    let (status, res) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parse(&res)["order"]["total_amount"], 300_000);
    assert_eq!(stock_of(&db, cap.id).await, 2);
    assert!(carts.fetch_cart(user.id).await.unwrap().is_empty());

    let req = TestRequest::post().uri("/orders/from_cart").set_json(body);
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    tear_down(db).await;
}

#[actix_web::test]
async fn order_lifecycle_over_http() {
    let db = setup_db().await;
    let user = seed_user(&db, "carol").await;
    let mug = seed_variant(&db, "MUG", 90_000, 3).await;
    let req = TestRequest::post().uri("/orders/buy_now").set_json(buy_now_body(user.id, mug.id, 1));
    let (_, body) = send_request(req, configure(db.clone())).await;
    let order_id = parse(&body)["order"]["id"].as_i64().expect("order id");

    let (status, body) = set_status(&db, order_id, "Confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["status"], "Confirmed");
    let (status, _) = set_status(&db, order_id, "Confirmed").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = set_status(&db, order_id, "Shipping").await;
    assert_eq!(status, StatusCode::OK);

    let req = TestRequest::post().uri(&format!("/order/{order_id}/cancel"));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(parse(&body)["error"].as_str().is_some_and(|e| e.contains("cannot be cancelled")));
    assert_eq!(stock_of(&db, mug.id).await, 2);

    let (status, body) = set_status(&db, order_id, "Delivered").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["status"], "Delivered");

    let (status, _) = set_status(&db, order_id, "Unheard-of").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    tear_down(db).await;
}

#[actix_web::test]
async fn cancelling_restores_stock() {
    let db = setup_db().await;
    let user = seed_user(&db, "dave").await;
    let mug = seed_variant(&db, "MUG", 90_000, 3).await;
    let req = TestRequest::post().uri("/orders/buy_now").set_json(buy_now_body(user.id, mug.id, 3));
    let (_, body) = send_request(req, configure(db.clone())).await;
    let order_id = parse(&body)["order"]["id"].as_i64().expect("order id");
    assert_eq!(stock_of(&db, mug.id).await, 0);

    let req = TestRequest::post().uri(&format!("/order/{order_id}/cancel"));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["status"], "Cancelled");
    assert_eq!(stock_of(&db, mug.id).await, 3);

    let (status, _) = set_status(&db, order_id, "Cancelled").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(stock_of(&db, mug.id).await, 3);
    tear_down(db).await;
}

#[actix_web::test]
async fn order_reads() {
    let db = setup_db().await;
    let user = seed_user(&db, "erin").await;
    let mug = seed_variant(&db, "MUG", 90_000, 10).await;
    for qty in [1, 2] {
        let req = TestRequest::post().uri("/orders/buy_now").set_json(buy_now_body(user.id, mug.id, qty));
        let (status, _) = send_request(req, configure(db.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let req = TestRequest::get().uri(&format!("/orders/user/{}", user.id));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let orders = parse(&body);
    let orders = orders.as_array().expect("a list of orders");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1]["total_amount"], 180_000);

    let order_id = orders[0]["id"].as_i64().expect("order id");
    let (status, body) = send_request(TestRequest::get().uri(&format!("/order/{order_id}")), configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["details"][0]["quantity"], 1);

    let (status, _) = send_request(TestRequest::get().uri("/order/9999"), configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_request(TestRequest::get().uri("/orders/user/9999"), configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}
