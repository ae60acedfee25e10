//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use order_engine::{
    traits::{CartManagement, CommerceDatabase},
    CallbackOutcome,
    CartApi,
    CommerceError,
    OrderFlowApi,
    PaymentFlowApi,
};
use wallet_gateway::IpnNotification;

use crate::{
    data_objects::{
        AddCartItemParams,
        BuyNowParams,
        CreatePaymentParams,
        FromCartParams,
        PaymentCreatedResult,
        PaymentReturnParams,
        UpdateCartItemParams,
        UpdateStatusParams,
    },
    errors::ServerError,
    integrations::wallet::IpnProvider,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(cart => Get "/cart/{user_id}" impl CartManagement);
/// Returns the user's cart, creating an empty one on first access.
pub async fn cart<B: CartManagement>(
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ GET cart for user #{user_id}");
    let cart = api.fetch_cart(user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_cart_item => Post "/cart/{user_id}/items" impl CartManagement);
/// Adds a variant to the cart. If it is already there, the quantities are added together.
pub async fn add_cart_item<B: CartManagement>(
    path: web::Path<i64>,
    body: web::Json<AddCartItemParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    let AddCartItemParams { variant_id, quantity } = body.into_inner();
    debug!("💻️ POST add {quantity} of variant #{variant_id} to cart for user #{user_id}");
    let cart = api.add_item(user_id, variant_id, quantity).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(update_cart_item => Put "/cart/{user_id}/items/{variant_id}" impl CartManagement);
pub async fn update_cart_item<B: CartManagement>(
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateCartItemParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (user_id, variant_id) = path.into_inner();
    let quantity = body.quantity;
    debug!("💻️ PUT variant #{variant_id} to {quantity} in cart for user #{user_id}");
    let cart = api.update_item(user_id, variant_id, quantity).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(remove_cart_item => Delete "/cart/{user_id}/items/{variant_id}" impl CartManagement);
pub async fn remove_cart_item<B: CartManagement>(
    path: web::Path<(i64, i64)>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (user_id, variant_id) = path.into_inner();
    debug!("💻️ DELETE variant #{variant_id} from cart for user #{user_id}");
    let cart = api.remove_item(user_id, variant_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(clear_cart => Delete "/cart/{user_id}" impl CartManagement);
pub async fn clear_cart<B: CartManagement>(
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ DELETE cart for user #{user_id}");
    let cart = api.clear_cart(user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(buy_now => Post "/orders/buy_now" impl CommerceDatabase);
/// Orders a single variant straight away. The stock is reserved in the same transaction that writes the order.
pub async fn buy_now<B: CommerceDatabase>(
    body: web::Json<BuyNowParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let BuyNowParams { user_id, variant_id, quantity, shipping } = body.into_inner();
    debug!("💻️ POST buy_now {quantity} of variant #{variant_id} for user #{user_id}");
    let order = api.buy_now(user_id, variant_id, quantity, shipping).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(order_from_cart => Post "/orders/from_cart" impl CommerceDatabase);
/// Turns the whole cart into one order. Either every line is reserved and the cart is emptied, or nothing changes.
pub async fn order_from_cart<B: CommerceDatabase>(
    body: web::Json<FromCartParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let FromCartParams { user_id, cart_id, shipping } = body.into_inner();
    debug!("💻️ POST order from cart #{cart_id} for user #{user_id}");
    let order = api.create_order_from_cart(user_id, cart_id, shipping).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(order_by_id => Get "/order/{order_id}" impl CommerceDatabase);
pub async fn order_by_id<B: CommerceDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id}");
    let order = api.fetch_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_for_user => Get "/orders/user/{user_id}" impl CommerceDatabase);
pub async fn orders_for_user<B: CommerceDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ GET orders for user #{user_id}");
    let orders = api.orders_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Put "/order/{order_id}/status" impl CommerceDatabase);
/// Moves an order along the lifecycle. Asking for `Cancelled` restores the stock, exactly as the cancel route does.
pub async fn update_order_status<B: CommerceDatabase>(
    path: web::Path<i64>,
    body: web::Json<UpdateStatusParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let target = body.status;
    debug!("💻️ PUT order #{order_id} status to {target}");
    let order = api.update_order_status(order_id, target).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/order/{order_id}/cancel" impl CommerceDatabase);
pub async fn cancel_order<B: CommerceDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST cancel order #{order_id}");
    let order = api.cancel_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(create_payment => Post "/payments" impl CommerceDatabase, IpnProvider);
/// Opens a payment for a `Pending` order. The amount must equal the order total.
pub async fn create_payment<B: CommerceDatabase, P: IpnProvider>(
    body: web::Json<CreatePaymentParams>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let CreatePaymentParams { order_id, amount, method } = body.into_inner();
    debug!("💻️ POST {method} payment of {amount} for order #{order_id}");
    let created = api.create_payment(order_id, amount, method).await?;
    Ok(HttpResponse::Created().json(PaymentCreatedResult::from(created)))
}

route!(payments_for_order => Get "/payments/order/{order_id}" impl CommerceDatabase, IpnProvider);
pub async fn payments_for_order<B: CommerceDatabase, P: IpnProvider>(
    path: web::Path<i64>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payments for order #{order_id}");
    let payments = api.payments_for_order(order_id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

route!(payment_by_txid => Get "/payment/{txid}" impl CommerceDatabase, IpnProvider);
pub async fn payment_by_txid<B: CommerceDatabase, P: IpnProvider>(
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let txid = path.into_inner();
    debug!("💻️ GET payment {txid}");
    let payment = api.get_payment_status(&txid).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payment_return => Get "/payments/return" impl CommerceDatabase, IpnProvider);
/// Where the provider sends the shopper after checkout. This only reports the payment's current state. The outcome
/// is applied when the IPN arrives.
pub async fn payment_return<B: CommerceDatabase, P: IpnProvider>(
    query: web::Query<PaymentReturnParams>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let txid = query.into_inner().txid;
    debug!("💻️ GET payment return for {txid}");
    let payment = api.get_payment_status(&txid).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payment_ipn => Post "/payments/ipn" impl CommerceDatabase, IpnProvider);
/// Receives the provider's instant payment notification.
///
/// Every notification that passes verification is acknowledged with `204 No Content`, including replays and unknown
/// transaction ids, so that the provider stops retrying. Forged or malformed notifications get a `400`. A database
/// failure returns a `500` and the provider will try again.
pub async fn payment_ipn<B: CommerceDatabase, P: IpnProvider>(
    body: web::Json<IpnNotification>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let notification = body.into_inner();
    debug!("💻️ POST IPN for {} (result code {})", notification.order_id, notification.result_code);
    match api.handle_payment_callback(&notification).await {
        Ok(CallbackOutcome::Applied(payment)) => {
            info!("💻️ IPN applied. Payment {} is {}", payment.txid, payment.status);
        },
        Ok(CallbackOutcome::Replayed(payment)) => {
            info!("💻️ IPN for {} was a replay. Nothing changed.", payment.txid);
        },
        Ok(CallbackOutcome::PaymentNotFound(txid)) => {
            warn!("💻️ IPN for unknown payment {txid}. Acknowledging anyway.");
        },
        Err(e @ CommerceError::InvalidCallback(_)) => {
            warn!("💻️ Rejected IPN for {}. {e}", notification.order_id);
            return Err(e.into());
        },
        Err(e) => {
            error!("💻️ Could not process IPN for {}. {e}", notification.order_id);
            return Err(e.into());
        },
    }
    Ok(HttpResponse::NoContent().finish())
}
