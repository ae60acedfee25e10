//! Adapts the wallet gateway client to the order engine's [`PaymentProvider`] contract.
use log::*;
use order_engine::{
    PaymentProvider,
    ProviderError,
    ProviderPaymentRequest,
    ProviderPaymentResponse,
    VerifiedCallback,
};
use shop_common::Money;
use wallet_gateway::{IpnNotification, PaymentOrder, WalletGatewayApi, WalletGatewayConfig, WalletGatewayError};

/// A payment provider whose notifications arrive as wallet IPN posts. The HTTP routes are generic over this, so
/// tests can substitute a mock.
pub trait IpnProvider: PaymentProvider<Notification = IpnNotification> {}

impl<T> IpnProvider for T where T: PaymentProvider<Notification = IpnNotification> {}

#[derive(Clone)]
pub struct WalletProvider {
    api: WalletGatewayApi,
}

impl WalletProvider {
    pub fn new(config: WalletGatewayConfig) -> Result<Self, WalletGatewayError> {
        let api = WalletGatewayApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentProvider for WalletProvider {
    type Notification = IpnNotification;

    async fn request_payment(&self, request: ProviderPaymentRequest) -> Result<ProviderPaymentResponse, ProviderError> {
        let order = PaymentOrder {
            request_id: request.txid.clone(),
            txid: request.txid,
            amount: request.amount.value(),
            order_info: request.description,
            extra_data: String::default(),
        };
        let response = self.api.create_payment(order).await.map_err(provider_error)?;
        Ok(ProviderPaymentResponse {
            redirect_url: response.pay_url,
            deeplink: response.deeplink,
            message: Some(response.message),
        })
    }

    fn verify_notification(&self, notification: &IpnNotification) -> Result<VerifiedCallback, ProviderError> {
        self.api.verify_notification(notification).map_err(|e| {
            warn!("💳️ IPN for {} failed verification. {e}", notification.order_id);
            ProviderError::InvalidNotification(e.to_string())
        })?;
        Ok(callback_from_ipn(notification))
    }
}

/// Reduces a verified notification to what reconciliation needs.
pub fn callback_from_ipn(notification: &IpnNotification) -> VerifiedCallback {
    VerifiedCallback {
        txid: notification.order_id.clone(),
        amount: Money::from(notification.amount),
        result_code: notification.result_code,
        provider_ref: Some(notification.trans_id.to_string()),
        message: Some(notification.message.clone()),
    }
}

fn provider_error(e: WalletGatewayError) -> ProviderError {
    match e {
        WalletGatewayError::Timeout => ProviderError::Timeout,
        WalletGatewayError::Rejected { code, message } => ProviderError::Declined { code, message },
        WalletGatewayError::InvalidSignature |
        WalletGatewayError::PartnerMismatch(_) |
        WalletGatewayError::MissingField(_) => ProviderError::InvalidNotification(e.to_string()),
        e => ProviderError::Transport(e.to_string()),
    }
}
