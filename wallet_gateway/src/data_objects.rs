use serde::{Deserialize, Serialize};

use crate::signature::canonical_string;

/// The provider's result code for a successful operation.
pub const RESULT_CODE_SUCCESS: i64 = 0;

/// What the shop wants to charge. The gateway turns this into a signed [`PaymentRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOrder {
    /// Our transaction id. The provider calls it `orderId`, and echoes it back in the notification.
    pub txid: String,
    pub request_id: String,
    pub amount: i64,
    pub order_info: String,
    pub extra_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub partner_code: String,
    pub request_id: String,
    pub amount: i64,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub request_type: String,
    pub extra_data: String,
    pub lang: String,
    pub signature: String,
}

impl PaymentRequest {
    /// The string the request signature is computed over.
    pub fn signing_payload(&self, access_key: &str) -> String {
        let amount = self.amount.to_string();
        canonical_string(&[
            ("accessKey", access_key),
            ("amount", amount.as_str()),
            ("extraData", self.extra_data.as_str()),
            ("ipnUrl", self.ipn_url.as_str()),
            ("orderId", self.order_id.as_str()),
            ("orderInfo", self.order_info.as_str()),
            ("partnerCode", self.partner_code.as_str()),
            ("redirectUrl", self.redirect_url.as_str()),
            ("requestId", self.request_id.as_str()),
            ("requestType", self.request_type.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub partner_code: String,
    pub order_id: String,
    pub request_id: String,
    pub amount: i64,
    #[serde(default)]
    pub response_time: i64,
    #[serde(default)]
    pub message: String,
    pub result_code: i64,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub deeplink: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
}

/// The instant payment notification the provider posts to the IPN url once the shopper has paid (or given up).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IpnNotification {
    pub partner_code: String,
    pub order_id: String,
    pub request_id: String,
    pub amount: i64,
    #[serde(default)]
    pub order_info: String,
    #[serde(default)]
    pub order_type: String,
    pub trans_id: i64,
    pub result_code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pay_type: String,
    pub response_time: i64,
    #[serde(default)]
    pub extra_data: String,
    pub signature: String,
}

impl IpnNotification {
    /// The string the notification signature is computed over.
    pub fn signing_payload(&self, access_key: &str) -> String {
        let amount = self.amount.to_string();
        let response_time = self.response_time.to_string();
        let result_code = self.result_code.to_string();
        let trans_id = self.trans_id.to_string();
        canonical_string(&[
            ("accessKey", access_key),
            ("amount", amount.as_str()),
            ("extraData", self.extra_data.as_str()),
            ("message", self.message.as_str()),
            ("orderId", self.order_id.as_str()),
            ("orderInfo", self.order_info.as_str()),
            ("orderType", self.order_type.as_str()),
            ("partnerCode", self.partner_code.as_str()),
            ("payType", self.pay_type.as_str()),
            ("requestId", self.request_id.as_str()),
            ("responseTime", response_time.as_str()),
            ("resultCode", result_code.as_str()),
            ("transId", trans_id.as_str()),
        ])
    }

    pub fn is_success(&self) -> bool {
        self.result_code == RESULT_CODE_SUCCESS
    }
}
