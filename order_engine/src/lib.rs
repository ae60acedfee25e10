//! Order Engine
//!
//! The order engine is the core of the shop backend: it turns carts and "buy now" requests into orders, keeps the
//! inventory consistent while doing so, drives orders through their status state machine, and reconciles the
//! asynchronous payment notifications that arrive from the payment provider.
//!
//! The library is divided into these main sections:
//! 1. Backend contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need to
//!    call the database directly. Use the public API instead. The exception is the data types stored in the
//!    database, which are defined in the [`db_types`] module and are public.
//! 2. The public API ([`CartApi`], [`OrderFlowApi`], [`PaymentFlowApi`]).
//! 3. The order and payment state machines ([`transitions`]), kept as plain data so they can be tested in isolation.
//!
//! The engine also emits events when orders are created, paid, cancelled or otherwise change status. A simple
//! pub-sub framework ([`events`]) lets you hook into them.
pub mod db_types;
pub mod events;
pub mod traits;
pub mod transitions;

mod shop_api;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use shop_api::{
    cart_api::CartApi,
    order_flow_api::OrderFlowApi,
    payment_flow_api::{new_txid, PaymentFlowApi},
    payment_objects::{CallbackOutcome, PaymentCreated},
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use traits::{
    CartManagement,
    CartWithLines,
    CatalogManagement,
    CommerceDatabase,
    CommerceError,
    OrderChanged,
    OrderWithDetails,
    PaymentProvider,
    ProviderError,
    ProviderPaymentRequest,
    ProviderPaymentResponse,
    VerifiedCallback,
};
