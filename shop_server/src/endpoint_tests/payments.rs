use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use order_engine::{
    db_types::{Money, Order, PaymentMethod},
    events::EventProducers,
    test_utils::prepare_env::tear_down,
    OrderFlowApi,
    PaymentFlowApi,
    PaymentProvider,
    ProviderError,
    ProviderPaymentResponse,
    SqliteDatabase,
};
use serde_json::json;
use shop_common::Secret;
use wallet_gateway::{signature::sign, IpnNotification, WalletGatewayConfig};

use super::{
    helpers::{parse, seed_user, seed_variant, send_request, setup_db, shipping},
    mocks::MockProvider,
};
use crate::{
    integrations::wallet::{IpnProvider, WalletProvider},
    routes::{CreatePaymentRoute, PaymentByTxidRoute, PaymentIpnRoute, PaymentReturnRoute, PaymentsForOrderRoute},
};

const PARTNER_CODE: &str = "SHOPTEST";
const ACCESS_KEY: &str = "F8BBA842ECF85";
const SECRET_KEY: &str = "K951B6PE1waDMi640xX08PD3vg6EkVlz";

fn configure<P: IpnProvider + 'static>(db: SqliteDatabase, provider: P) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(PaymentFlowApi::new(db, provider, EventProducers::default())))
            .service(CreatePaymentRoute::<SqliteDatabase, P>::new())
            .service(PaymentReturnRoute::<SqliteDatabase, P>::new())
            .service(PaymentIpnRoute::<SqliteDatabase, P>::new())
            .service(PaymentsForOrderRoute::<SqliteDatabase, P>::new())
            .service(PaymentByTxidRoute::<SqliteDatabase, P>::new());
    }
}

fn wallet_provider() -> WalletProvider {
    let config = WalletGatewayConfig {
        partner_code: PARTNER_CODE.into(),
        access_key: Secret::new(ACCESS_KEY.into()),
        secret_key: Secret::new(SECRET_KEY.into()),
        ..Default::default()
    };
    WalletProvider::new(config).expect("Could not create provider")
}

fn signed_ipn(txid: &str, amount: i64, result_code: i64) -> IpnNotification {
    let mut ipn = IpnNotification {
        partner_code: PARTNER_CODE.into(),
        order_id: txid.into(),
        request_id: txid.into(),
        amount,
        order_info: "Payment for order".into(),
        order_type: "momo_wallet".into(),
        trans_id: 4_088_878_653,
        result_code,
        message: if result_code == 0 { "Successful." } else { "Transaction denied by user." }.into(),
        pay_type: "qr".into(),
        response_time: 1_722_500_000_000,
        extra_data: String::default(),
        signature: String::default(),
    };
    ipn.signature = sign(SECRET_KEY, &ipn.signing_payload(ACCESS_KEY)).expect("Could not sign");
    ipn
}

async fn pending_order(db: &SqliteDatabase, username: &str) -> Order {
    let user = seed_user(db, username).await;
    let variant = seed_variant(db, &format!("SKU-{username}"), 250_000, 5).await;
    let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
    orders.buy_now(user.id, variant.id, 2, shipping()).await.expect("Could not place order").order
}

async fn generic_payment(db: &SqliteDatabase, order: &Order) -> String {
    let api = PaymentFlowApi::new(db.clone(), wallet_provider(), EventProducers::default());
    let created = api.create_payment(order.id, order.total_amount, PaymentMethod::Generic).await.unwrap();
    created.txid().to_string()
}

async fn order_status(db: &SqliteDatabase, order_id: i64) -> String {
    let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
    orders.fetch_order(order_id).await.unwrap().order.status.to_string()
}

#[actix_web::test]
async fn wallet_payment_returns_redirect() {
    let db = setup_db().await;
    let order = pending_order(&db, "alice").await;
    let mut provider = MockProvider::new();
    provider.expect_request_payment().times(1).returning(|req| {
        Ok(ProviderPaymentResponse {
            redirect_url: Some(format!("https://pay.example.com/{}", req.txid)),
            deeplink: Some(format!("wallet://pay/{}", req.txid)),
            message: Some("Successful.".into()),
        })
    });
    let body = json!({ "order_id": order.id, "amount": 500_000, "method": "ExternalWallet" });
    let req = TestRequest::post().uri("/payments").set_json(body);
    let (status, body) = send_request(req, configure(db.clone(), provider)).await;
    assert_eq!(status, StatusCode::CREATED);
    let result = parse(&body);
    let txid = result["txid"].as_str().expect("txid").to_string();
    assert!(txid.starts_with("TX"));
    assert_eq!(result["redirect_url"], format!("https://pay.example.com/{txid}"));
    assert_eq!(result["deeplink"], format!("wallet://pay/{txid}"));
    assert_eq!(result["payment"]["status"], "Pending");
    tear_down(db).await;
}

#[actix_web::test]
async fn generic_payment_skips_the_provider() {
    let db = setup_db().await;
    let order = pending_order(&db, "bob").await;
    let mut provider = MockProvider::new();
    provider.expect_request_payment().never();
    let body = json!({ "order_id": order.id, "amount": 500_000, "method": "Generic" });
    let req = TestRequest::post().uri("/payments").set_json(body);
    let (status, body) = send_request(req, configure(db.clone(), provider)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parse(&body)["redirect_url"], json!(null));
    tear_down(db).await;
}

#[actix_web::test]
async fn provider_failure_is_a_bad_gateway() {
    let db = setup_db().await;
    let order = pending_order(&db, "carol").await;
    let mut provider = MockProvider::new();
    provider.expect_request_payment().times(1).returning(|_| Err(ProviderError::Timeout));
    let body = json!({ "order_id": order.id, "amount": 500_000, "method": "ExternalWallet" });
    let req = TestRequest::post().uri("/payments").set_json(body);
    let (status, body) = send_request(req, configure(db.clone(), provider)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(parse(&body)["error"].as_str().is_some_and(|e| e.contains("provider")));

    let req = TestRequest::get().uri(&format!("/payments/order/{}", order.id));
    let (status, body) = send_request(req, configure(db.clone(), MockProvider::new())).await;
    assert_eq!(status, StatusCode::OK);
    let payments = parse(&body);
    assert_eq!(payments.as_array().map(|p| p.len()), Some(1));
    assert_eq!(payments[0]["status"], "Pending");
    tear_down(db).await;
}

#[actix_web::test]
async fn payment_validation() {
    let db = setup_db().await;
    let order = pending_order(&db, "dave").await;
    let body = json!({ "order_id": order.id, "amount": 499_999, "method": "Generic" });
    let req = TestRequest::post().uri("/payments").set_json(body);
    let (status, _) = send_request(req, configure(db.clone(), MockProvider::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "order_id": 9_999, "amount": 500_000, "method": "Generic" });
    let req = TestRequest::post().uri("/payments").set_json(body);
    let (status, _) = send_request(req, configure(db.clone(), MockProvider::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    OrderFlowApi::new(db.clone(), EventProducers::default()).cancel_order(order.id).await.unwrap();
    let body = json!({ "order_id": order.id, "amount": 500_000, "method": "Generic" });
    let req = TestRequest::post().uri("/payments").set_json(body);
    let (status, _) = send_request(req, configure(db.clone(), MockProvider::new())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    tear_down(db).await;
}

#[actix_web::test]
async fn ipn_pays_the_order_and_replays_are_acknowledged() {
    let db = setup_db().await;
    let order = pending_order(&db, "erin").await;
    let txid = generic_payment(&db, &order).await;
    let ipn = signed_ipn(&txid, 500_000, 0);

    for _ in 0..2 {
        let req = TestRequest::post().uri("/payments/ipn").set_json(&ipn);
        let (status, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }
    assert_eq!(order_status(&db, order.id).await, "Paid");

    let req = TestRequest::get().uri(&format!("/payment/{txid}"));
    let (status, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::OK);
    let payment = parse(&body);
    assert_eq!(payment["status"], "Success");
    assert_eq!(payment["provider_ref"], "4088878653");
    tear_down(db).await;
}

#[actix_web::test]
async fn failed_ipn_leaves_the_order_pending() {
    let db = setup_db().await;
    let order = pending_order(&db, "frank").await;
    let txid = generic_payment(&db, &order).await;
    let req = TestRequest::post().uri("/payments/ipn").set_json(signed_ipn(&txid, 500_000, 1006));
    let (status, _) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(order_status(&db, order.id).await, "Pending");
    let req = TestRequest::get().uri(&format!("/payments/return?orderId={txid}&resultCode=1006"));
    let (status, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["status"], "Failed");
    tear_down(db).await;
}

#[actix_web::test]
async fn ipn_for_unknown_payment_is_acknowledged() {
    let db = setup_db().await;
    let order = pending_order(&db, "grace").await;
    let req = TestRequest::post().uri("/payments/ipn").set_json(signed_ipn("TX0000000000000000000000", 500_000, 0));
    let (status, _) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(order_status(&db, order.id).await, "Pending");

    let req = TestRequest::get().uri("/payments/return?orderId=TX0000000000000000000000");
    let (status, _) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn forged_or_malformed_ipn_is_rejected() {
    let db = setup_db().await;
    let order = pending_order(&db, "heidi").await;
    let txid = generic_payment(&db, &order).await;

    let mut forged = signed_ipn(&txid, 500_000, 0);
    forged.signature = "00".repeat(32);
    let req = TestRequest::post().uri("/payments/ipn").set_json(&forged);
    let (status, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&body)["error"].as_str().is_some());

    let mut tampered = signed_ipn(&txid, 500_000, 0);
    tampered.amount = 1_000;
    let req = TestRequest::post().uri("/payments/ipn").set_json(&tampered);
    let (status, _) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/payments/ipn").set_json(json!({ "orderId": txid }));
    let (status, _) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(order_status(&db, order.id).await, "Pending");
    let req = TestRequest::get().uri(&format!("/payment/{txid}"));
    let (_, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(parse(&body)["status"], "Pending");
    tear_down(db).await;
}

#[actix_web::test]
async fn genuine_ipn_with_wrong_amount_fails_the_payment() {
    let db = setup_db().await;
    let order = pending_order(&db, "ivan").await;
    assert_eq!(order.total_amount, Money::from(500_000));
    let txid = generic_payment(&db, &order).await;
    let req = TestRequest::post().uri("/payments/ipn").set_json(signed_ipn(&txid, 400_000, 0));
    let (status, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert_eq!(order_status(&db, order.id).await, "Pending");

    let req = TestRequest::get().uri(&format!("/payment/{txid}"));
    let (_, body) = send_request(req, configure(db.clone(), wallet_provider())).await;
    let payment = parse(&body);
    assert_eq!(payment["status"], "Failed");
    assert!(payment["provider_message"].as_str().unwrap_or_default().starts_with("Amount mismatch"));
    tear_down(db).await;
}

#[test]
fn wallet_provider_verifies_signed_notifications() {
    let provider = wallet_provider();
    let callback = provider.verify_notification(&signed_ipn("TX1", 10_000, 0)).expect("Valid notification");
    assert_eq!(callback.txid, "TX1");
    assert_eq!(callback.amount, Money::from(10_000));
    assert!(callback.is_success());
    let mut forged = signed_ipn("TX1", 10_000, 0);
    forged.result_code = 0;
    forged.message = "Changed".into();
    assert!(provider.verify_notification(&forged).is_err());
}
