//! # Order engine public API
//!
//! The `shop_api` module exposes the programmatic API of the order engine. The API is modular, so clients can pick
//! the parts they need.
//!
//! * [`cart_api`] manages a user's shopping cart.
//! * [`order_flow_api`] assembles orders (buy-now or from a cart) and drives them through their lifecycle.
//! * [`payment_flow_api`] records payment attempts, talks to the payment provider and reconciles its callbacks.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use order_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let order = api.buy_now(user_id, variant_id, 2, shipping).await?;
//! ```
pub mod cart_api;
pub mod order_flow_api;
pub mod payment_flow_api;
pub mod payment_objects;
