use serde::{Deserialize, Serialize};

use crate::db_types::Payment;

/// The result of opening a payment. For external wallet payments, the shopper is sent to `redirect_url` (or
/// `deeplink` on mobile) to complete the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCreated {
    pub payment: Payment,
    pub redirect_url: Option<String>,
    pub deeplink: Option<String>,
}

impl PaymentCreated {
    pub fn txid(&self) -> &str {
        self.payment.txid.as_str()
    }
}

/// What happened to a provider callback that passed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackOutcome {
    /// The payment reached its final state
    Applied(Payment),
    /// The payment was already final, so the callback was ignored
    Replayed(Payment),
    /// No payment with this transaction id exists
    PaymentNotFound(String),
}
