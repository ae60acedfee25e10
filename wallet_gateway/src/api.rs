use std::sync::Arc;

use log::*;
use reqwest::Client;

use crate::{
    data_objects::{IpnNotification, PaymentOrder, PaymentRequest, PaymentResponse, RESULT_CODE_SUCCESS},
    signature::{sign, verify},
    WalletGatewayConfig,
    WalletGatewayError,
};

#[derive(Clone)]
pub struct WalletGatewayApi {
    config: WalletGatewayConfig,
    client: Arc<Client>,
}

impl WalletGatewayApi {
    pub fn new(config: WalletGatewayConfig) -> Result<Self, WalletGatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WalletGatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &WalletGatewayConfig {
        &self.config
    }

    /// Builds the signed request body for a payment, without sending it.
    pub fn build_request(&self, order: PaymentOrder) -> Result<PaymentRequest, WalletGatewayError> {
        let mut request = PaymentRequest {
            partner_code: self.config.partner_code.clone(),
            request_id: order.request_id,
            amount: order.amount,
            order_id: order.txid,
            order_info: order.order_info,
            redirect_url: self.config.redirect_url.clone(),
            ipn_url: self.config.ipn_url.clone(),
            request_type: self.config.request_type.clone(),
            extra_data: order.extra_data,
            lang: self.config.lang.clone(),
            signature: String::default(),
        };
        let payload = request.signing_payload(self.config.access_key.reveal());
        request.signature = sign(self.config.secret_key.reveal(), &payload)?;
        Ok(request)
    }

    /// Asks the provider to open a payment session. A response carrying a non-zero result code is returned as
    /// [`WalletGatewayError::Rejected`].
    pub async fn create_payment(&self, order: PaymentOrder) -> Result<PaymentResponse, WalletGatewayError> {
        let request = self.build_request(order)?;
        let txid = request.order_id.clone();
        debug!("💳️ Sending payment request for {txid} ({} đ) to {}", request.amount, self.config.endpoint);
        let response = self.client.post(&self.config.endpoint).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            warn!("💳️ Provider answered {status} for {txid}: {message}");
            return Err(WalletGatewayError::ResponseError(format!("HTTP {status}: {message}")));
        }
        let result = response.json::<PaymentResponse>().await?;
        if result.result_code != RESULT_CODE_SUCCESS {
            warn!("💳️ Provider rejected payment {txid}. Code {}: {}", result.result_code, result.message);
            return Err(WalletGatewayError::Rejected { code: result.result_code, message: result.message });
        }
        info!("💳️ Provider opened payment session for {txid}");
        Ok(result)
    }

    /// Checks that a notification was issued for this merchant and carries a valid signature.
    pub fn verify_notification(&self, notification: &IpnNotification) -> Result<(), WalletGatewayError> {
        if notification.order_id.is_empty() {
            return Err(WalletGatewayError::MissingField("orderId"));
        }
        if notification.signature.is_empty() {
            return Err(WalletGatewayError::MissingField("signature"));
        }
        if notification.partner_code != self.config.partner_code {
            return Err(WalletGatewayError::PartnerMismatch(notification.partner_code.clone()));
        }
        let payload = notification.signing_payload(self.config.access_key.reveal());
        verify(self.config.secret_key.reveal(), &payload, &notification.signature)
    }
}
