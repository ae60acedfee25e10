use thiserror::Error;

use crate::{db_types::Money, traits::data_objects::VerifiedCallback};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("The provider did not answer in time")]
    Timeout,
    #[error("Could not reach the provider: {0}")]
    Transport(String),
    #[error("The provider declined the request. Result code {code}. {message}")]
    Declined { code: i64, message: String },
    #[error("The notification failed verification: {0}")]
    InvalidNotification(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPaymentRequest {
    pub txid: String,
    pub order_id: i64,
    pub amount: Money,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderPaymentResponse {
    pub redirect_url: Option<String>,
    pub deeplink: Option<String>,
    pub message: Option<String>,
}

/// An external payment provider.
///
/// Implementations own the provider's wire format and signing scheme. The engine only ever sees a
/// [`ProviderPaymentRequest`] going out and a [`VerifiedCallback`] coming back.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// The provider's raw notification payload
    type Notification;

    /// Opens a payment session with the provider. Implementations must give up after a bounded time and report
    /// [`ProviderError::Timeout`].
    async fn request_payment(&self, request: ProviderPaymentRequest) -> Result<ProviderPaymentResponse, ProviderError>;

    /// Checks the notification's signature and required fields.
    fn verify_notification(&self, notification: &Self::Notification) -> Result<VerifiedCallback, ProviderError>;
}
