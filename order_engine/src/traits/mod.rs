//! # Backend contracts
//!
//! This module defines the behaviour that storage backends and payment providers need to expose in order to be driven
//! by the order engine.
//!
//! * [`CatalogManagement`] is the narrow window onto users and the product catalog, plus the inventory ledger
//!   (reserve and restore stock).
//! * [`CartManagement`] stores shopping carts and their lines.
//! * [`CommerceDatabase`] defines the highest level of behaviour: order assembly, the order lifecycle and payment
//!   reconciliation, each as one atomic unit of work.
//! * [`PaymentProvider`] abstracts the external payment provider.
mod cart_management;
mod catalog_management;
mod commerce_database;
mod errors;
mod payment_provider;

mod data_objects;

pub use cart_management::{CartManagement, LineUpdate};
pub use catalog_management::CatalogManagement;
pub use commerce_database::CommerceDatabase;
pub use data_objects::{CartWithLines, OrderChanged, OrderWithDetails, ReconcileResult, VerifiedCallback};
pub use errors::CommerceError;
pub use payment_provider::{PaymentProvider, ProviderError, ProviderPaymentRequest, ProviderPaymentResponse};
