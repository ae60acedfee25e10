use serde::{Deserialize, Serialize};

use crate::db_types::{Cart, CartLine, Money, Order, OrderDetail, Payment};

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithDetails {
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

impl OrderWithDetails {
    pub fn new(order: Order, details: Vec<OrderDetail>) -> Self {
        Self { order, details }
    }

    /// The sum of the detail subtotals. This always equals `order.total_amount`.
    pub fn details_total(&self) -> Money {
        self.details.iter().map(|d| d.subtotal).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartWithLines {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

impl CartWithLines {
    pub fn new(cart: Cart, lines: Vec<CartLine>) -> Self {
        Self { cart, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_for_variant(&self, variant_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.variant_id == variant_id)
    }
}

/// An order before and after a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChanged {
    pub old_order: Order,
    pub new_order: Order,
}

impl OrderChanged {
    pub fn new(old_order: Order, new_order: Order) -> Self {
        Self { old_order, new_order }
    }
}

/// A provider notification whose signature has been checked, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedCallback {
    pub txid: String,
    pub amount: Money,
    /// The provider's result code. Zero means the shopper paid.
    pub result_code: i64,
    pub provider_ref: Option<String>,
    pub message: Option<String>,
}

impl VerifiedCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }
}

/// What the backend did with a verified callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileResult {
    /// The payment moved out of `Pending`. `order` holds the status change if the order moved to `Paid`.
    Applied { payment: Payment, order: Option<OrderChanged> },
    /// The payment had already reached a final state. Nothing was changed.
    Replayed(Payment),
    /// No payment with the callback's transaction id exists. Nothing was changed.
    NotFound,
}
