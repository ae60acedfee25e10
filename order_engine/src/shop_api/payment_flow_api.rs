use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{Money, NewPayment, Payment, PaymentMethod},
    events::{EventProducers, OrderPaidEvent, OrderStatusChangedEvent},
    shop_api::payment_objects::{CallbackOutcome, PaymentCreated},
    traits::{CommerceDatabase, CommerceError, PaymentProvider, ProviderPaymentRequest, ReconcileResult},
};

const MAX_TXID_ATTEMPTS: usize = 3;

/// `PaymentFlowApi` records payment attempts, opens payment sessions with the provider, and reconciles the provider's
/// asynchronous callbacks with payments and orders.
///
/// Payments go from `Pending` to either `Success` or `Failed`, and stay there. A successful callback also moves the
/// order from `Pending` to `Paid`.
pub struct PaymentFlowApi<B, P> {
    db: B,
    provider: P,
    producers: EventProducers,
}

impl<B, P> Debug for PaymentFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, P> PaymentFlowApi<B, P> {
    pub fn new(db: B, provider: P, producers: EventProducers) -> Self {
        Self { db, provider, producers }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<B, P> PaymentFlowApi<B, P>
where
    B: CommerceDatabase,
    P: PaymentProvider,
{
    /// Records a payment attempt for a `Pending` order. `amount` must equal the order total.
    ///
    /// `Generic` payments are only recorded. `ExternalWallet` payments are also sent to the provider, and the
    /// provider's pay url and deeplink are returned. If the provider fails, [`CommerceError::ProviderFailure`] is
    /// returned and the payment stays `Pending`.
    pub async fn create_payment(
        &self,
        order_id: i64,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<PaymentCreated, CommerceError> {
        let payment = self.insert_payment_with_fresh_txid(order_id, amount, method).await?;
        let txid = payment.txid.clone();
        info!("💳️ Payment {txid} ({amount}, {method}) recorded for order #{order_id}");
        if method == PaymentMethod::Generic {
            return Ok(PaymentCreated { payment, redirect_url: None, deeplink: None });
        }
        let request = ProviderPaymentRequest {
            txid: txid.clone(),
            order_id,
            amount,
            description: format!("Payment for order #{order_id}"),
        };
        match self.provider.request_payment(request).await {
            Ok(response) => {
                let payment = self.db.annotate_payment(&txid, None, response.message.clone()).await?;
                debug!("💳️ Provider accepted payment {txid}");
                Ok(PaymentCreated { payment, redirect_url: response.redirect_url, deeplink: response.deeplink })
            },
            Err(e) => {
                error!("💳️ Provider request for payment {txid} failed. {e}");
                if let Err(e2) = self.db.annotate_payment(&txid, None, Some(e.to_string())).await {
                    warn!("💳️ Could not record the provider failure on payment {txid}. {e2}");
                }
                Err(CommerceError::ProviderFailure(e.to_string()))
            },
        }
    }

    async fn insert_payment_with_fresh_txid(
        &self,
        order_id: i64,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<Payment, CommerceError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let payment = NewPayment { order_id, amount, method, txid: new_txid() };
            match self.db.insert_payment(payment).await {
                Err(CommerceError::PaymentAlreadyExists(txid)) if attempts < MAX_TXID_ATTEMPTS => {
                    warn!("💳️ Transaction id {txid} is already taken. Generating another.");
                },
                result => return result,
            }
        }
    }

    /// Reconciles a provider notification.
    ///
    /// Notifications that fail verification are rejected with [`CommerceError::InvalidCallback`] and change nothing.
    /// Every other notification is a business outcome and is never reported as an error:
    /// * unknown transaction id: [`CallbackOutcome::PaymentNotFound`], nothing changes.
    /// * payment already final: [`CallbackOutcome::Replayed`], nothing changes.
    /// * amount differs from the payment: the payment becomes `Failed` ([`CallbackOutcome::Applied`]).
    /// * otherwise the payment becomes `Success` or `Failed` ([`CallbackOutcome::Applied`]), and a successful payment
    ///   moves its order to `Paid`.
    pub async fn handle_payment_callback(
        &self,
        notification: &P::Notification,
    ) -> Result<CallbackOutcome, CommerceError> {
        let callback = self.provider.verify_notification(notification).map_err(|e| {
            warn!("💳️ Rejecting payment callback. {e}");
            CommerceError::InvalidCallback(e.to_string())
        })?;
        let txid = callback.txid.clone();
        debug!("💳️ Verified callback for {txid}. Result code {}", callback.result_code);
        match self.db.reconcile_payment(&callback).await? {
            ReconcileResult::NotFound => {
                warn!("💳️ Received a callback for {txid}, but there is no such payment");
                Ok(CallbackOutcome::PaymentNotFound(txid))
            },
            ReconcileResult::Replayed(payment) => {
                info!("💳️ Payment {txid} is already {}. Callback ignored.", payment.status);
                Ok(CallbackOutcome::Replayed(payment))
            },
            ReconcileResult::Applied { payment, order } => {
                info!("💳️ Payment {txid} for order #{} is now {}", payment.order_id, payment.status);
                if let Some(changed) = order {
                    info!("💳️ Order #{} has been paid", changed.new_order.id);
                    for emitter in &self.producers.order_paid_producer {
                        debug!("🔄️💰️ Notifying order paid hook subscribers");
                        emitter.publish_event(OrderPaidEvent::new(changed.new_order.clone(), payment.clone())).await;
                    }
                    for emitter in &self.producers.order_status_changed_producer {
                        let event = OrderStatusChangedEvent::new(changed.old_order.status, changed.new_order.clone());
                        emitter.publish_event(event).await;
                    }
                }
                Ok(CallbackOutcome::Applied(payment))
            },
        }
    }

    /// A pure read of a payment. This is also what the provider's "return" redirect resolves to.
    pub async fn get_payment_status(&self, txid: &str) -> Result<Payment, CommerceError> {
        self.db.fetch_payment_by_txid(txid).await?.ok_or_else(|| CommerceError::PaymentNotFound(txid.to_string()))
    }

    pub async fn payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, CommerceError> {
        if self.db.fetch_order(order_id).await?.is_none() {
            return Err(CommerceError::OrderNotFound(order_id));
        }
        self.db.fetch_payments_for_order(order_id).await
    }
}

/// A fresh transaction id: a millisecond timestamp followed by 48 random bits. Uniqueness is enforced by the
/// database, and [`PaymentFlowApi::create_payment`] retries on the (unlikely) collision.
pub fn new_txid() -> String {
    let noise = rand::random::<u64>() & 0xFFFF_FFFF_FFFF;
    format!("TX{}{noise:012X}", Utc::now().timestamp_millis())
}
