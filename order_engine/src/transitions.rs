//! The order and payment state machines, expressed as data.
//!
//! | From      | Action           | To        |
//! |-----------|------------------|-----------|
//! | Pending   | Confirm          | Confirmed |
//! | Pending   | PaymentSucceeded | Paid      |
//! | Paid      | Confirm          | Confirmed |
//! | Confirmed | Dispatch         | Shipping  |
//! | Shipping  | Deliver          | Delivered |
//! | Pending   | Cancel           | Cancelled |
//! | Confirmed | Cancel           | Cancelled |
//!
//! Anything not in the table is illegal, including "transitions" to the current state. `Delivered` and `Cancelled`
//! have no outgoing edges.
//!
//! Payments are simpler: `Pending` may become `Success` or `Failed`, and both of those are final.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    db_types::{OrderStatusType, PaymentStatusType},
    traits::CommerceError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderAction {
    Confirm,
    PaymentSucceeded,
    Dispatch,
    Deliver,
    Cancel,
}

use OrderAction::*;
use OrderStatusType::*;

pub const ORDER_TRANSITIONS: [(OrderStatusType, OrderAction, OrderStatusType); 7] = [
    (Pending, Confirm, Confirmed),
    (Pending, PaymentSucceeded, Paid),
    (Paid, Confirm, Confirmed),
    (Confirmed, Dispatch, Shipping),
    (Shipping, Deliver, Delivered),
    (Pending, Cancel, Cancelled),
    (Confirmed, Cancel, Cancelled),
];

pub const PAYMENT_TRANSITIONS: [(PaymentStatusType, PaymentStatusType); 2] =
    [(PaymentStatusType::Pending, PaymentStatusType::Success), (PaymentStatusType::Pending, PaymentStatusType::Failed)];

impl OrderAction {
    /// The status an order ends up in when this action succeeds.
    pub fn target(&self) -> OrderStatusType {
        match self {
            Confirm => Confirmed,
            PaymentSucceeded => Paid,
            Dispatch => Shipping,
            Deliver => Delivered,
            Cancel => Cancelled,
        }
    }

    /// The action a manual status change request maps to. `Pending` and `Paid` cannot be requested manually.
    pub fn for_manual_target(target: OrderStatusType) -> Option<Self> {
        match target {
            Confirmed => Some(Confirm),
            Shipping => Some(Dispatch),
            Delivered => Some(Deliver),
            Cancelled => Some(Cancel),
            Pending | Paid => None,
        }
    }
}

impl Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confirm => write!(f, "Confirm"),
            PaymentSucceeded => write!(f, "PaymentSucceeded"),
            Dispatch => write!(f, "Dispatch"),
            Deliver => write!(f, "Deliver"),
            Cancel => write!(f, "Cancel"),
        }
    }
}

/// Looks the transition up in [`ORDER_TRANSITIONS`].
pub fn next_order_status(from: OrderStatusType, action: OrderAction) -> Option<OrderStatusType> {
    ORDER_TRANSITIONS.iter().find(|(f, a, _)| *f == from && *a == action).map(|(_, _, to)| *to)
}

/// Like [`next_order_status`], but produces the error the engine reports for a forbidden transition.
pub fn check_order_transition(from: OrderStatusType, action: OrderAction) -> Result<OrderStatusType, CommerceError> {
    next_order_status(from, action).ok_or(CommerceError::IllegalTransition { from, to: action.target() })
}

pub fn can_transition_payment(from: PaymentStatusType, to: PaymentStatusType) -> bool {
    PAYMENT_TRANSITIONS.iter().any(|(f, t)| *f == from && *t == to)
}

impl PaymentStatusType {
    pub fn is_terminal(&self) -> bool {
        !PAYMENT_TRANSITIONS.iter().any(|(from, _)| from == self)
    }
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        !ORDER_TRANSITIONS.iter().any(|(from, _, _)| from == self)
    }
}
