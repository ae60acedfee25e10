use serde::{Deserialize, Serialize};
use shop_common::Money;
use order_engine::{
    db_types::{OrderStatusType, Payment, PaymentMethod, ShippingDetails},
    PaymentCreated,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemParams {
    pub variant_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItemParams {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyNowParams {
    pub user_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    #[serde(flatten)]
    pub shipping: ShippingDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FromCartParams {
    pub user_id: i64,
    pub cart_id: i64,
    #[serde(flatten)]
    pub shipping: ShippingDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusParams {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentParams {
    pub order_id: i64,
    pub amount: Money,
    pub method: PaymentMethod,
}

/// The answer to a new payment. The shopper is sent to `redirect_url` (or `deeplink` on mobile) for wallet payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreatedResult {
    pub txid: String,
    pub redirect_url: Option<String>,
    pub deeplink: Option<String>,
    pub payment: Payment,
}

impl From<PaymentCreated> for PaymentCreatedResult {
    fn from(value: PaymentCreated) -> Self {
        Self {
            txid: value.payment.txid.clone(),
            redirect_url: value.redirect_url,
            deeplink: value.deeplink,
            payment: value.payment,
        }
    }
}

/// The query string the provider appends when it sends the shopper back to the shop. Only `orderId` (our txid) is
/// used. The provider's other parameters are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReturnParams {
    #[serde(rename = "orderId")]
    pub txid: String,
}
