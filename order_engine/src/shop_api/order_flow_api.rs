use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderStatusType, ShippingDetails},
    events::{EventProducers, OrderAnnulledEvent, OrderCreatedEvent, OrderStatusChangedEvent},
    traits::{CatalogManagement, CommerceDatabase, CommerceError, OrderChanged, OrderWithDetails},
    transitions::OrderAction,
};

/// `OrderFlowApi` is the primary API for assembling orders and driving them through their lifecycle.
///
/// Order status follows this table. Anything else is rejected with [`CommerceError::IllegalTransition`] and leaves
/// the order untouched.
///
/// | From      | Action           | To        |
/// |-----------|------------------|-----------|
/// | Pending   | Confirm          | Confirmed |
/// | Pending   | PaymentSucceeded | Paid      |
/// | Paid      | Confirm          | Confirmed |
/// | Confirmed | Dispatch         | Shipping  |
/// | Shipping  | Deliver          | Delivered |
/// | Pending   | Cancel           | Cancelled |
/// | Confirmed | Cancel           | Cancelled |
///
/// `PaymentSucceeded` is only ever applied by [`crate::PaymentFlowApi`].
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: CommerceDatabase
{
    /// Places a single-item order. The stock is reserved and the order written in one transaction, so either both
    /// happen or neither does.
    pub async fn buy_now(
        &self,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
        shipping: ShippingDetails,
    ) -> Result<OrderWithDetails, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let order = self.db.insert_buy_now_order(user_id, variant_id, quantity, shipping).await.map_err(|e| {
            debug!("🔄️📦️ Buy-now of {quantity} x variant #{variant_id} for user #{user_id} failed. {e}");
            e
        })?;
        info!(
            "🔄️📦️ Order #{} placed by user #{user_id}: {quantity} x variant #{variant_id}, total {}",
            order.order.id, order.order.total_amount
        );
        self.call_order_created_hook(&order).await;
        Ok(order)
    }

    /// Converts the user's cart into an order. Either every line is reserved and the cart emptied, or nothing
    /// changes.
    pub async fn create_order_from_cart(
        &self,
        user_id: i64,
        cart_id: i64,
        shipping: ShippingDetails,
    ) -> Result<OrderWithDetails, CommerceError> {
        let order = self.db.insert_order_from_cart(user_id, cart_id, shipping).await.map_err(|e| {
            debug!("🔄️📦️ Could not convert cart #{cart_id} of user #{user_id}. {e}");
            e
        })?;
        info!(
            "🔄️📦️ Order #{} placed by user #{user_id} from cart #{cart_id}: {} lines, total {}",
            order.order.id,
            order.details.len(),
            order.order.total_amount
        );
        self.call_order_created_hook(&order).await;
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<OrderWithDetails, CommerceError> {
        self.db.fetch_order(order_id).await?.ok_or(CommerceError::OrderNotFound(order_id))
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, CommerceError> {
        if self.db.find_user(user_id).await?.is_none() {
            return Err(CommerceError::UserNotFound(user_id));
        }
        self.db.fetch_orders_for_user(user_id).await
    }

    /// A manual status change. `Confirmed`, `Shipping` and `Delivered` advance the order along the transition table;
    /// `Cancelled` takes the [`Self::cancel_order`] path, so stock is restored. `Pending` and `Paid` can never be
    /// requested.
    pub async fn update_order_status(&self, order_id: i64, target: OrderStatusType) -> Result<Order, CommerceError> {
        match OrderAction::for_manual_target(target) {
            Some(OrderAction::Cancel) => self.cancel_order(order_id).await.map_err(|e| match e {
                CommerceError::NotCancellable(from) => CommerceError::IllegalTransition { from, to: target },
                e => e,
            }),
            Some(action) => {
                let changed = self.db.transition_order(order_id, action).await.map_err(|e| {
                    warn!("🔄️📦️ Could not move order #{order_id} to {target}. {e}");
                    e
                })?;
                info!("🔄️📦️ Order #{order_id} moved from {} to {}", changed.old_order.status, changed.new_order.status);
                self.call_order_status_changed_hook(&changed).await;
                Ok(changed.new_order)
            },
            None => {
                let order = self.fetch_order(order_id).await?;
                warn!("🔄️📦️ {target} is not a valid manual target for order #{order_id}");
                Err(CommerceError::IllegalTransition { from: order.order.status, to: target })
            },
        }
    }

    /// Cancels the order and returns every line's quantity to stock, in one transaction. Only `Pending` and
    /// `Confirmed` orders can be cancelled.
    pub async fn cancel_order(&self, order_id: i64) -> Result<Order, CommerceError> {
        let changed = match self.db.transition_order(order_id, OrderAction::Cancel).await {
            Ok(changed) => changed,
            Err(CommerceError::IllegalTransition { from, .. }) => {
                warn!("🔄️❌️ Order #{order_id} is {from} and cannot be cancelled");
                return Err(CommerceError::NotCancellable(from));
            },
            Err(e) => return Err(e),
        };
        info!("🔄️❌️ Order #{order_id} cancelled. Stock has been restored.");
        self.call_order_annulled_hook(&changed).await;
        self.call_order_status_changed_hook(&changed).await;
        Ok(changed.new_order)
    }

    async fn call_order_created_hook(&self, order: &OrderWithDetails) {
        for emitter in &self.producers.order_created_producer {
            debug!("🔄️📦️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_order_annulled_hook(&self, changed: &OrderChanged) {
        for emitter in &self.producers.order_annulled_producer {
            debug!("🔄️❌️ Notifying order annulled hook subscribers");
            let event = OrderAnnulledEvent::new(changed.new_order.clone(), changed.old_order.status);
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_status_changed_hook(&self, changed: &OrderChanged) {
        for emitter in &self.producers.order_status_changed_producer {
            let event = OrderStatusChangedEvent::new(changed.old_order.status, changed.new_order.clone());
            emitter.publish_event(event).await;
        }
    }
}
