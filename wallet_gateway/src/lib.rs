//! # Wallet gateway
//!
//! A thin client for the external e-wallet payment provider. It knows how to
//! * build and sign a "create payment" request and send it to the provider's creation endpoint,
//! * verify the signature on the instant payment notifications (IPN) that the provider posts back.
//!
//! The client is configured with an immutable [`WalletGatewayConfig`] at construction time. Nothing in this crate
//! touches the order database; reconciliation lives in the order engine.
mod api;
mod config;
mod error;
pub mod signature;

mod data_objects;

pub use api::WalletGatewayApi;
pub use config::WalletGatewayConfig;
pub use data_objects::{IpnNotification, PaymentOrder, PaymentRequest, PaymentResponse, RESULT_CODE_SUCCESS};
pub use error::WalletGatewayError;
