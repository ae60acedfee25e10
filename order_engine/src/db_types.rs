//! Data types that are stored in, and read from, the database.
//!
//! Every aggregate refers to its parent by id only. There are no in-memory back references; use the lookup
//! accessors on the backend traits to navigate relations.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use shop_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn new<S: Into<String>>(username: S, email: S) -> Self {
        Self { username: username.into(), email: email.into() }
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Variant       ---------------------------------------------------------
/// A purchasable variant of a product. The stock count is only ever changed by reserving or restoring inventory.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    /// The list price
    pub price: Money,
    /// When set, the variant is on sale and this price is charged instead of the list price.
    pub sale_price: Option<Money>,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    pub fn is_discounted(&self) -> bool {
        self.sale_price.is_some()
    }

    /// The price a shopper pays for one unit of this variant right now.
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub product_id: i64,
    pub sku: String,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub stock: i64,
}

impl NewVariant {
    pub fn new<S: Into<String>>(product_id: i64, sku: S, price: Money, stock: i64) -> Self {
        Self { product_id, sku: sku.into(), price, sale_price: None, stock }
    }

    pub fn with_sale_price(mut self, sale_price: Money) -> Self {
        self.sale_price = Some(sale_price);
        self
    }
}

//--------------------------------------        Cart         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    /// Always the sum of the line subtotals
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub cart_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    /// Unit price snapshot, refreshed whenever the line changes
    pub price: Money,
    pub subtotal: Money,
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been placed and stock reserved. No payment has been received.
    Pending,
    /// A payment for the full order amount has been received from the payment provider.
    Paid,
    /// The merchant has accepted the order.
    Confirmed,
    /// The order has been handed to the courier.
    Shipping,
    /// The shopper has the goods. Terminal.
    Delivered,
    /// The order was cancelled and its stock returned. Terminal.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Confirmed => write!(f, "Confirmed"),
            OrderStatusType::Shipping => write!(f, "Shipping"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Confirmed" => Ok(Self::Confirmed),
            "Shipping" => Ok(Self::Shipping),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   ShippingDetails   ---------------------------------------------------------
/// Where the order goes. Copied onto the order when it is created, so later address book edits do not affect it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub recipient_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl ShippingDetails {
    pub fn new<S: Into<String>>(recipient_name: S, phone: S, address: S) -> Self {
        Self { recipient_name: recipient_name.into(), phone: phone.into(), address: address.into(), note: None }
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatusType,
    pub total_amount: Money,
    pub recipient_name: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn shipping(&self) -> ShippingDetails {
        ShippingDetails {
            recipient_name: self.recipient_name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            note: self.note.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    pub price: Money,
    pub subtotal: Money,
}

/// A line that is about to be written to an order. The subtotal is derived on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub variant_id: i64,
    pub quantity: i64,
    pub price: Money,
}

impl NewOrderLine {
    pub fn subtotal(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}

//--------------------------------------  PaymentStatusType  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum PaymentStatusType {
    /// Created, waiting for the provider to tell us how it went
    Pending,
    Success,
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "Pending"),
            PaymentStatusType::Success => write!(f, "Success"),
            PaymentStatusType::Failed => write!(f, "Failed"),
        }
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Recorded without contacting a provider (cash on delivery, bank transfer and the like)
    Generic,
    /// Paid through the external e-wallet provider
    ExternalWallet,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Generic => write!(f, "Generic"),
            PaymentMethod::ExternalWallet => write!(f, "ExternalWallet"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Generic" => Ok(Self::Generic),
            "ExternalWallet" => Ok(Self::ExternalWallet),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------       Payment       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: Money,
    pub method: PaymentMethod,
    /// Globally unique. Sent to the provider as its order id and echoed back in notifications.
    pub txid: String,
    pub status: PaymentStatusType,
    /// The provider's own transaction reference, once known
    pub provider_ref: Option<String>,
    /// The last message the provider sent about this payment
    pub provider_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub order_id: i64,
    pub amount: Money,
    pub method: PaymentMethod,
    pub txid: String,
}
