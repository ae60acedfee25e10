use std::time::Duration;

use actix_web::{dev::Server, error::JsonPayloadError, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use futures::FutureExt;
use log::*;
use order_engine::{
    events::{EventHandlers, EventHooks, EventProducers, DEFAULT_EVENT_BUFFER_SIZE},
    CartApi,
    OrderFlowApi,
    PaymentFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::wallet::WalletProvider,
    routes::{
        health,
        AddCartItemRoute,
        BuyNowRoute,
        CancelOrderRoute,
        CartRoute,
        ClearCartRoute,
        CreatePaymentRoute,
        OrderByIdRoute,
        OrderFromCartRoute,
        OrdersForUserRoute,
        PaymentByTxidRoute,
        PaymentIpnRoute,
        PaymentReturnRoute,
        PaymentsForOrderRoute,
        RemoveCartItemRoute,
        UpdateCartItemRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    let provider = WalletProvider::new(config.wallet.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the wallet provider. {e}")))?;
    let handlers = EventHandlers::new(DEFAULT_EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: WalletProvider,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone());
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let payments_api = PaymentFlowApi::new(db.clone(), provider.clone(), producers.clone());
        let api_scope = web::scope("/api")
            .service(CartRoute::<SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(BuyNowRoute::<SqliteDatabase>::new())
            .service(OrderFromCartRoute::<SqliteDatabase>::new())
            .service(OrdersForUserRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(CreatePaymentRoute::<SqliteDatabase, WalletProvider>::new())
            .service(PaymentReturnRoute::<SqliteDatabase, WalletProvider>::new())
            .service(PaymentIpnRoute::<SqliteDatabase, WalletProvider>::new())
            .service(PaymentsForOrderRoute::<SqliteDatabase, WalletProvider>::new())
            .service(PaymentByTxidRoute::<SqliteDatabase, WalletProvider>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("shop::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies are reported in the same `{"error": ...}` shape as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            async move {
                let order = &ev.order.order;
                info!("📬️ Order #{} created for user #{} ({})", order.id, order.user_id, order.total_amount);
            }
            .boxed()
        })
        .on_order_paid(|ev| {
            async move {
                info!("📬️ Order #{} paid with {}", ev.order.id, ev.payment.txid);
            }
            .boxed()
        })
        .on_order_annulled(|ev| {
            async move {
                info!("📬️ Order #{} cancelled. It was {}.", ev.order.id, ev.previous_status);
            }
            .boxed()
        })
        .on_order_status_changed(|ev| {
            async move {
                debug!("📬️ Order #{} moved from {} to {}", ev.order.id, ev.old_status, ev.order.status);
            }
            .boxed()
        });
    hooks
}
