use thiserror::Error;

use crate::db_types::{Money, OrderStatusType};

/// Every failure the engine can report. Validation failures are never partially applied: the enclosing database
/// transaction is rolled back before one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommerceError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested user {0} does not exist")]
    UserNotFound(i64),
    #[error("The requested variant {0} does not exist")]
    VariantNotFound(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Cart {cart_id} does not exist or does not belong to user {user_id}")]
    CartNotFound { cart_id: i64, user_id: i64 },
    #[error("Variant {0} is not in the cart")]
    CartItemNotFound(i64),
    #[error("Cannot insert payment, since it already exists with txid {0}")]
    PaymentAlreadyExists(String),
    #[error("The requested payment does not exist for txid {0}")]
    PaymentNotFound(String),
    #[error("Not enough stock for variant {variant_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { variant_id: i64, requested: i64, available: i64 },
    #[error("Quantity must be at least 1, but was {0}")]
    InvalidQuantity(i64),
    #[error("Cannot move an order from {from} to {to}")]
    IllegalTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("An order that is {0} cannot be cancelled")]
    NotCancellable(OrderStatusType),
    #[error("The cart for user {0} is empty")]
    EmptyCart(i64),
    #[error("Payment amount {received} does not match the order total {expected}")]
    PaymentAmountMismatch { expected: Money, received: Money },
    #[error("Order {order_id} is {status}, so it cannot be paid for")]
    OrderNotPayable { order_id: i64, status: OrderStatusType },
    #[error("The payment provider failed: {0}")]
    ProviderFailure(String),
    #[error("Rejected payment callback: {0}")]
    InvalidCallback(String),
}

impl From<sqlx::Error> for CommerceError {
    fn from(e: sqlx::Error) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}
