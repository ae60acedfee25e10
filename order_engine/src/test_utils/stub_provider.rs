//! An in-process payment provider for tests.
use std::sync::{Arc, Mutex};

use crate::traits::{
    PaymentProvider,
    ProviderError,
    ProviderPaymentRequest,
    ProviderPaymentResponse,
    VerifiedCallback,
};

/// A notification as the stub provider would deliver it. `genuine: false` simulates a forged signature.
#[derive(Debug, Clone)]
pub struct StubNotification {
    pub callback: VerifiedCallback,
    pub genuine: bool,
}

impl StubNotification {
    pub fn genuine(callback: VerifiedCallback) -> Self {
        Self { callback, genuine: true }
    }

    pub fn forged(callback: VerifiedCallback) -> Self {
        Self { callback, genuine: false }
    }
}

/// Accepts every payment request (unless told to fail) and remembers what it was asked.
#[derive(Debug, Clone, Default)]
pub struct StubProvider {
    fail_with: Option<ProviderError>,
    requests: Arc<Mutex<Vec<ProviderPaymentRequest>>>,
}

impl StubProvider {
    pub fn failing(error: ProviderError) -> Self {
        Self { fail_with: Some(error), requests: Arc::default() }
    }

    pub fn requests(&self) -> Vec<ProviderPaymentRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PaymentProvider for StubProvider {
    type Notification = StubNotification;

    async fn request_payment(&self, request: ProviderPaymentRequest) -> Result<ProviderPaymentResponse, ProviderError> {
        let txid = request.txid.clone();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        Ok(ProviderPaymentResponse {
            redirect_url: Some(format!("https://pay.example.com/checkout/{txid}")),
            deeplink: Some(format!("wallet://pay?tx={txid}")),
            message: Some("Successful.".to_string()),
        })
    }

    fn verify_notification(&self, notification: &Self::Notification) -> Result<VerifiedCallback, ProviderError> {
        if notification.genuine {
            Ok(notification.callback.clone())
        } else {
            Err(ProviderError::InvalidNotification("signature mismatch".to_string()))
        }
    }
}
