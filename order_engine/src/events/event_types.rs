use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderStatusType, Payment},
    traits::OrderWithDetails,
};

/// A new order was written and its stock reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: OrderWithDetails,
}

impl OrderCreatedEvent {
    pub fn new(order: OrderWithDetails) -> Self {
        Self { order }
    }
}

/// A provider callback confirmed payment and the order moved to `Paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub payment: Payment,
}

impl OrderPaidEvent {
    pub fn new(order: Order, payment: Payment) -> Self {
        Self { order, payment }
    }
}

/// The order was cancelled and its stock returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    /// The status the order was in before it was cancelled
    pub previous_status: OrderStatusType,
}

impl OrderAnnulledEvent {
    pub fn new(order: Order, previous_status: OrderStatusType) -> Self {
        Self { order, previous_status }
    }
}

/// Emitted for every status change, whatever caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub old_status: OrderStatusType,
    pub order: Order,
}

impl OrderStatusChangedEvent {
    pub fn new(old_status: OrderStatusType, order: Order) -> Self {
        Self { old_status, order }
    }
}
