use crate::{
    db_types::{NewPayment, Order, Payment, ShippingDetails},
    traits::{
        data_objects::{OrderChanged, OrderWithDetails, ReconcileResult, VerifiedCallback},
        CartManagement,
        CatalogManagement,
        CommerceError,
    },
    transitions::OrderAction,
};

/// This trait defines the highest level of behaviour for backends supporting the order engine.
///
/// This behaviour includes:
/// * Assembling orders from a single variant or from a cart, reserving stock in the same transaction as the order is
///   written.
/// * Driving orders through the transition table, restoring stock on cancellation.
/// * Recording payment attempts and reconciling provider callbacks against them.
///
/// Every method is a single atomic unit of work. If it returns an error, nothing was changed.
#[allow(async_fn_in_trait)]
pub trait CommerceDatabase: Clone + CatalogManagement + CartManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Reserves `quantity` units of the variant and writes a `Pending` order with a single detail line, priced at the
    /// variant's current effective price.
    async fn insert_buy_now_order(
        &self,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
        shipping: ShippingDetails,
    ) -> Result<OrderWithDetails, CommerceError>;

    /// Converts the cart into a `Pending` order.
    ///
    /// Every line's stock is checked before anything is reserved, so either all lines are reserved and the order is
    /// written, or nothing changes. The cart is emptied once the order rows are in place.
    async fn insert_order_from_cart(
        &self,
        user_id: i64,
        cart_id: i64,
        shipping: ShippingDetails,
    ) -> Result<OrderWithDetails, CommerceError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderWithDetails>, CommerceError>;

    /// All orders placed by the user, oldest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, CommerceError>;

    /// Applies `action` to the order according to the transition table. The status write is conditioned on the
    /// status that was read, so a concurrent change is reported as an illegal transition instead of being
    /// overwritten. [`OrderAction::Cancel`] also restores the stock of every detail line in the same transaction.
    async fn transition_order(&self, order_id: i64, action: OrderAction) -> Result<OrderChanged, CommerceError>;

    /// Records a new `Pending` payment attempt. The order must be `Pending` and the amount must match its total.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, CommerceError>;

    /// Stores the provider's reference and latest message on a payment, without touching its status.
    async fn annotate_payment(
        &self,
        txid: &str,
        provider_ref: Option<String>,
        message: Option<String>,
    ) -> Result<Payment, CommerceError>;

    async fn fetch_payment_by_txid(&self, txid: &str) -> Result<Option<Payment>, CommerceError>;

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, CommerceError>;

    /// Applies a verified provider callback to the matching payment and, on success, moves its order from `Pending`
    /// to `Paid`. Callbacks for payments that are already final are reported as [`ReconcileResult::Replayed`]
    /// and change nothing. A callback whose amount differs from the recorded amount marks the payment `Failed`.
    async fn reconcile_payment(&self, callback: &VerifiedCallback) -> Result<ReconcileResult, CommerceError>;
}
