use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use order_engine::{test_utils::prepare_env::tear_down, CartApi, SqliteDatabase};
use serde_json::json;

use super::helpers::{parse, seed_user, seed_variant, send_request, setup_db};
use crate::routes::{AddCartItemRoute, CartRoute, ClearCartRoute, RemoveCartItemRoute, UpdateCartItemRoute};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(CartApi::new(db)))
            .service(CartRoute::<SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new());
    }
}

#[actix_web::test]
async fn empty_cart_is_created_on_first_access() {
    let db = setup_db().await;
    let user = seed_user(&db, "alice").await;
    let req = TestRequest::get().uri(&format!("/cart/{}", user.id));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let cart = parse(&body);
    assert_eq!(cart["cart"]["user_id"], user.id);
    assert_eq!(cart["cart"]["total"], 0);
    assert_eq!(cart["lines"], json!([]));
    tear_down(db).await;
}

#[actix_web::test]
async fn cart_for_unknown_user() {
    let db = setup_db().await;
    let (status, body) = send_request(TestRequest::get().uri("/cart/404"), configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(parse(&body)["error"].as_str().is_some());
    tear_down(db).await;
}

#[actix_web::test]
async fn add_update_remove_and_clear() {
    let db = setup_db().await;
    let user = seed_user(&db, "bob").await;
    let shirt = seed_variant(&db, "SHIRT-M", 120_000, 10).await;
    let socks = seed_variant(&db, "SOCKS", 30_000, 10).await;
    let items = format!("/cart/{}/items", user.id);

    let req = TestRequest::post().uri(&items).set_json(json!({ "variant_id": shirt.id, "quantity": 2 }));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let req = TestRequest::post().uri(&items).set_json(json!({ "variant_id": socks.id, "quantity": 3 }));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["cart"]["total"], 330_000);

    let req = TestRequest::put().uri(&format!("{items}/{}", shirt.id)).set_json(json!({ "quantity": 1 }));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["cart"]["total"], 210_000);

    let req = TestRequest::delete().uri(&format!("{items}/{}", socks.id));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let cart = parse(&body);
    assert_eq!(cart["cart"]["total"], 120_000);
    assert_eq!(cart["lines"].as_array().map(|l| l.len()), Some(1));

    let req = TestRequest::delete().uri(&format!("/cart/{}", user.id));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["cart"]["total"], 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn invalid_cart_changes_are_rejected() {
    let db = setup_db().await;
    let user = seed_user(&db, "carol").await;
    let mug = seed_variant(&db, "MUG", 90_000, 2).await;
    let items = format!("/cart/{}/items", user.id);

    let req = TestRequest::post().uri(&items).set_json(json!({ "variant_id": mug.id, "quantity": 3 }));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let req = TestRequest::post().uri(&items).set_json(json!({ "variant_id": mug.id, "quantity": 0 }));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri(&items).set_json(json!({ "variant_id": 9_999, "quantity": 1 }));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::put().uri(&format!("{items}/{}", mug.id)).set_json(json!({ "quantity": 1 }));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::post().uri(&items).set_payload("not json").insert_header(("content-type", "application/json"));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&body)["error"].as_str().is_some());
    tear_down(db).await;
}
