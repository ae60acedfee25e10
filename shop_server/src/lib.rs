//! # Shop server
//! This crate hosts the HTTP server for the shop backend. It is responsible for:
//! * Exposing the cart, order and payment operations of the order engine over a JSON API.
//! * Opening payment sessions with the external wallet provider.
//! * Receiving the provider's instant payment notifications (IPN) and handing them to the engine for reconciliation.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/cart/...`: Cart management.
//! * `/api/orders/...`, `/api/order/...`: Order creation and the order lifecycle.
//! * `/api/payments/...`, `/api/payment/...`: Payments, the provider return url and the IPN endpoint.
pub mod cli;
pub mod config;
pub mod errors;

pub mod data_objects;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
