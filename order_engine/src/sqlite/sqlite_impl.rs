//! `SqliteDatabase` is a concrete implementation of an order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{carts, db_url, new_pool, orders, payments, users, variants};
use crate::{
    db_types::{
        Cart,
        CartLine,
        NewOrderLine,
        NewPayment,
        NewUser,
        NewVariant,
        Order,
        OrderStatusType,
        Payment,
        PaymentStatusType,
        Product,
        ShippingDetails,
        User,
        Variant,
    },
    traits::{
        CartManagement,
        CartWithLines,
        CatalogManagement,
        CommerceDatabase,
        CommerceError,
        LineUpdate,
        OrderChanged,
        OrderWithDetails,
        ReconcileResult,
        VerifiedCallback,
    },
    transitions::{can_transition_payment, check_order_transition, next_order_status, OrderAction},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<User, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(user, &mut conn).await?;
        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn insert_product(&self, name: &str) -> Result<Product, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let product = variants::insert_product(name, &mut conn).await?;
        Ok(product)
    }

    async fn insert_variant(&self, variant: NewVariant) -> Result<Variant, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        variants::insert_variant(variant, &mut conn).await
    }

    async fn find_variant(&self, variant_id: i64) -> Result<Option<Variant>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let variant = variants::fetch_variant(variant_id, &mut conn).await?;
        Ok(variant)
    }

    async fn save_variant(&self, variant: &Variant) -> Result<Variant, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        variants::update_variant(variant, &mut conn).await?.ok_or(CommerceError::VariantNotFound(variant.id))
    }

    async fn reserve_stock(&self, variant_id: i64, quantity: i64) -> Result<Variant, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let variant = variants::reserve(variant_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(variant)
    }

    async fn restore_stock(&self, variant_id: i64, quantity: i64) -> Result<Variant, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let variant = variants::restore(variant_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(variant)
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_or_create_cart(&self, user_id: i64) -> Result<CartWithLines, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let cart = carts::ensure_cart(user_id, &mut tx).await?;
        let lines = carts::fetch_lines(cart.id, &mut tx).await?;
        tx.commit().await?;
        Ok(CartWithLines::new(cart, lines))
    }

    async fn find_cart_by_user(&self, user_id: i64) -> Result<Option<Cart>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let cart = carts::fetch_cart_by_user(user_id, &mut conn).await?;
        Ok(cart)
    }

    async fn find_lines_by_cart(&self, cart_id: i64) -> Result<Vec<CartLine>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let lines = carts::fetch_lines(cart_id, &mut conn).await?;
        Ok(lines)
    }

    async fn upsert_cart_line(
        &self,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
        mode: LineUpdate,
    ) -> Result<CartWithLines, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let mut tx = self.pool.begin().await?;
        let cart = carts::ensure_cart(user_id, &mut tx).await?;
        let variant =
            variants::fetch_variant(variant_id, &mut tx).await?.ok_or(CommerceError::VariantNotFound(variant_id))?;
        let existing = carts::fetch_line(cart.id, variant_id, &mut tx).await?;
        let new_quantity = match (mode, existing) {
            (LineUpdate::Increment, Some(line)) => {
                line.quantity.checked_add(quantity).ok_or(CommerceError::InvalidQuantity(quantity))?
            },
            (LineUpdate::Increment, None) => quantity,
            (LineUpdate::Replace, Some(_)) => quantity,
            (LineUpdate::Replace, None) => return Err(CommerceError::CartItemNotFound(variant_id)),
        };
        if variant.stock < new_quantity {
            debug!("🗃️ Cart #{} wants {new_quantity} of variant #{variant_id}, but only {} in stock", cart.id, variant.stock);
            return Err(CommerceError::InsufficientStock {
                variant_id,
                requested: new_quantity,
                available: variant.stock,
            });
        }
        let price = variant.effective_price();
        let subtotal = price.checked_mul(new_quantity).ok_or(CommerceError::InvalidQuantity(new_quantity))?;
        carts::upsert_line(cart.id, variant_id, new_quantity, price, subtotal, &mut tx).await?;
        let cart = carts::recompute_total(cart.id, &mut tx).await?;
        let lines = carts::fetch_lines(cart.id, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Cart #{} now holds {new_quantity} of variant #{variant_id}. Total {}", cart.id, cart.total);
        Ok(CartWithLines::new(cart, lines))
    }

    async fn remove_cart_line(&self, user_id: i64, variant_id: i64) -> Result<CartWithLines, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let cart = carts::ensure_cart(user_id, &mut tx).await?;
        if !carts::delete_line(cart.id, variant_id, &mut tx).await? {
            return Err(CommerceError::CartItemNotFound(variant_id));
        }
        let cart = carts::recompute_total(cart.id, &mut tx).await?;
        let lines = carts::fetch_lines(cart.id, &mut tx).await?;
        tx.commit().await?;
        Ok(CartWithLines::new(cart, lines))
    }

    async fn delete_lines_by_cart(&self, user_id: i64) -> Result<CartWithLines, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let cart = carts::ensure_cart(user_id, &mut tx).await?;
        carts::delete_lines(cart.id, &mut tx).await?;
        let cart = carts::recompute_total(cart.id, &mut tx).await?;
        tx.commit().await?;
        Ok(CartWithLines::new(cart, Vec::new()))
    }
}

impl CommerceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// The stock reservation is the first statement in the transaction, so concurrent buy-now requests queue up on
    /// the write lock rather than failing.
    async fn insert_buy_now_order(
        &self,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
        shipping: ShippingDetails,
    ) -> Result<OrderWithDetails, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let variant = variants::reserve(variant_id, quantity, &mut tx).await?;
        if users::fetch_user(user_id, &mut tx).await?.is_none() {
            return Err(CommerceError::UserNotFound(user_id));
        }
        let line = NewOrderLine { variant_id, quantity, price: variant.effective_price() };
        let order = orders::insert_order_with_details(user_id, &[line], &shipping, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn insert_order_from_cart(
        &self,
        user_id: i64,
        cart_id: i64,
        shipping: ShippingDetails,
    ) -> Result<OrderWithDetails, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let cart =
            carts::lock_cart(cart_id, user_id, &mut tx).await?.ok_or(CommerceError::CartNotFound { cart_id, user_id })?;
        let lines = carts::fetch_lines(cart.id, &mut tx).await?;
        if lines.is_empty() {
            return Err(CommerceError::EmptyCart(user_id));
        }
        // Check everything before reserving anything
        let mut order_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            let variant = variants::fetch_variant(line.variant_id, &mut tx)
                .await?
                .ok_or(CommerceError::VariantNotFound(line.variant_id))?;
            if variant.stock < line.quantity {
                debug!(
                    "🗃️ Cart #{cart_id} cannot be converted. Variant #{} has {} in stock, {} requested",
                    variant.id, variant.stock, line.quantity
                );
                return Err(CommerceError::InsufficientStock {
                    variant_id: variant.id,
                    requested: line.quantity,
                    available: variant.stock,
                });
            }
            order_lines.push(NewOrderLine {
                variant_id: variant.id,
                quantity: line.quantity,
                price: variant.effective_price(),
            });
        }
        for line in &order_lines {
            variants::reserve(line.variant_id, line.quantity, &mut tx).await?;
        }
        let order = orders::insert_order_with_details(user_id, &order_lines, &shipping, &mut tx).await?;
        carts::delete_lines(cart.id, &mut tx).await?;
        carts::recompute_total(cart.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Cart #{cart_id} converted into order #{}", order.order.id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderWithDetails>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order(order_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let details = orders::fetch_details(order_id, &mut conn).await?;
        Ok(Some(OrderWithDetails::new(order, details)))
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn transition_order(&self, order_id: i64, action: OrderAction) -> Result<OrderChanged, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::lock_order(order_id, &mut tx).await?.ok_or(CommerceError::OrderNotFound(order_id))?;
        let next = check_order_transition(order.status, action)?;
        if action == OrderAction::Cancel {
            let details = orders::fetch_details(order_id, &mut tx).await?;
            for detail in &details {
                variants::restore(detail.variant_id, detail.quantity, &mut tx).await?;
            }
            debug!("🗃️ Restored stock for {} lines of order #{order_id}", details.len());
        }
        let updated = orders::update_status_if(order_id, order.status, next, &mut tx)
            .await?
            .ok_or(CommerceError::IllegalTransition { from: order.status, to: next })?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} moved from {} to {}", order.status, updated.status);
        Ok(OrderChanged::new(order, updated))
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, CommerceError> {
        let mut tx = self.pool.begin().await?;
        let order_id = payment.order_id;
        let order = orders::lock_order(order_id, &mut tx).await?.ok_or(CommerceError::OrderNotFound(order_id))?;
        if order.status != OrderStatusType::Pending {
            return Err(CommerceError::OrderNotPayable { order_id, status: order.status });
        }
        if order.total_amount != payment.amount {
            return Err(CommerceError::PaymentAmountMismatch { expected: order.total_amount, received: payment.amount });
        }
        let payment = payments::insert_payment(&payment, &mut tx).await?;
        tx.commit().await?;
        Ok(payment)
    }

    async fn annotate_payment(
        &self,
        txid: &str,
        provider_ref: Option<String>,
        message: Option<String>,
    ) -> Result<Payment, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        payments::annotate_payment(txid, provider_ref.as_deref(), message.as_deref(), &mut conn)
            .await?
            .ok_or_else(|| CommerceError::PaymentNotFound(txid.to_string()))
    }

    async fn fetch_payment_by_txid(&self, txid: &str) -> Result<Option<Payment>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_txid(txid, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, CommerceError> {
        let mut conn = self.pool.acquire().await?;
        let payments = payments::fetch_payments_for_order(order_id, &mut conn).await?;
        Ok(payments)
    }

    /// In a single atomic transaction,
    /// * locks the payment row. Unknown transaction ids and already-final payments change nothing.
    /// * decides the final status. A callback whose amount differs from the recorded amount, and a second successful
    ///   payment for an order that already has one, are both recorded as `Failed`, since an order is paid at most
    ///   once and only for its total.
    /// * writes the new payment status if [`can_transition_payment`] allows it.
    /// * on success, moves the order from `Pending` to `Paid` if the transition table allows it.
    async fn reconcile_payment(&self, callback: &VerifiedCallback) -> Result<ReconcileResult, CommerceError> {
        let txid = callback.txid.as_str();
        let mut tx = self.pool.begin().await?;
        let payment = match payments::lock_payment(txid, &mut tx).await? {
            Some(p) => p,
            None => {
                warn!("🗃️ Callback for unknown payment {txid}. Nothing to do.");
                return Ok(ReconcileResult::NotFound);
            },
        };
        if payment.status.is_terminal() {
            debug!("🗃️ Payment {txid} is already {}. Ignoring repeated callback.", payment.status);
            return Ok(ReconcileResult::Replayed(payment));
        }
        let (status, message) = if payment.amount != callback.amount {
            warn!("🗃️ Callback for {txid} reports {}, but {} was requested", callback.amount, payment.amount);
            let message =
                format!("Amount mismatch. The provider reported {}, expected {}.", callback.amount, payment.amount);
            (PaymentStatusType::Failed, Some(message))
        } else if !callback.is_success() {
            (PaymentStatusType::Failed, callback.message.clone())
        } else if payments::has_successful_payment(payment.order_id, &mut tx).await? {
            warn!("🗃️ Order #{} already has a successful payment. Marking {txid} as failed.", payment.order_id);
            (PaymentStatusType::Failed, Some("Duplicate payment. The order was already paid.".to_string()))
        } else {
            (PaymentStatusType::Success, callback.message.clone())
        };
        if !can_transition_payment(payment.status, status) {
            debug!("🗃️ Payment {txid} cannot move from {} to {status}. Ignoring callback.", payment.status);
            return Ok(ReconcileResult::Replayed(payment));
        }
        let payment = payments::finalize_payment(
            payment.id,
            payment.status,
            status,
            callback.provider_ref.as_deref(),
            message.as_deref(),
            &mut tx,
        )
        .await?
        .ok_or_else(|| CommerceError::DatabaseError(format!("Payment {txid} changed while it was locked")))?;
        let order = if status == PaymentStatusType::Success {
            let order_id = payment.order_id;
            let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(CommerceError::OrderNotFound(order_id))?;
            match next_order_status(order.status, OrderAction::PaymentSucceeded) {
                Some(next) => orders::update_status_if(order_id, order.status, next, &mut tx)
                    .await?
                    .map(|updated| OrderChanged::new(order, updated)),
                None => {
                    warn!(
                        "🗃️ Payment {txid} succeeded, but order #{order_id} is {}. The order status is unchanged.",
                        order.status
                    );
                    None
                },
            }
        } else {
            None
        };
        tx.commit().await?;
        debug!("🗃️ Payment {txid} is now {}", payment.status);
        Ok(ReconcileResult::Applied { payment, order })
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), CommerceError> {
        self.pool.close().await;
        Ok(())
    }
}
