use std::time::Duration;

use log::*;
use shop_common::Secret;

pub const DEFAULT_ENDPOINT: &str = "https://test-payment.momo.vn/v2/gateway/api/create";
pub const DEFAULT_REQUEST_TYPE: &str = "captureWallet";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Immutable provider settings. Built once at start-up and handed to [`crate::WalletGatewayApi`].
#[derive(Debug, Clone)]
pub struct WalletGatewayConfig {
    /// The provider's "create payment" endpoint.
    pub endpoint: String,
    pub partner_code: String,
    pub access_key: Secret<String>,
    pub secret_key: Secret<String>,
    /// Where the provider sends the shopper's browser after payment.
    pub redirect_url: String,
    /// Where the provider posts the instant payment notification.
    pub ipn_url: String,
    pub request_type: String,
    pub lang: String,
    pub timeout: Duration,
}

impl Default for WalletGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            partner_code: String::default(),
            access_key: Secret::default(),
            secret_key: Secret::default(),
            redirect_url: "http://localhost:8360/api/payments/return".to_string(),
            ipn_url: "http://localhost:8360/api/payments/ipn".to_string(),
            request_type: DEFAULT_REQUEST_TYPE.to_string(),
            lang: "vi".to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl WalletGatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let endpoint = std::env::var("SHOP_WALLET_ENDPOINT").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_WALLET_ENDPOINT not set, using the provider sandbox {}", defaults.endpoint);
            defaults.endpoint.clone()
        });
        let partner_code = std::env::var("SHOP_WALLET_PARTNER_CODE").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_WALLET_PARTNER_CODE not set. Payment requests will be rejected by the provider.");
            String::default()
        });
        let access_key = Secret::new(std::env::var("SHOP_WALLET_ACCESS_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_WALLET_ACCESS_KEY not set, using (probably useless) default");
            String::default()
        }));
        let secret_key = Secret::new(std::env::var("SHOP_WALLET_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_WALLET_SECRET_KEY not set. Notifications cannot be verified.");
            String::default()
        }));
        let redirect_url = std::env::var("SHOP_WALLET_REDIRECT_URL").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_WALLET_REDIRECT_URL not set, using {}", defaults.redirect_url);
            defaults.redirect_url.clone()
        });
        let ipn_url = std::env::var("SHOP_WALLET_IPN_URL").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_WALLET_IPN_URL not set, using {}", defaults.ipn_url);
            defaults.ipn_url.clone()
        });
        let request_type = std::env::var("SHOP_WALLET_REQUEST_TYPE").unwrap_or_else(|_| {
            info!("🪛️ SHOP_WALLET_REQUEST_TYPE not set, using {DEFAULT_REQUEST_TYPE}");
            defaults.request_type.clone()
        });
        let lang = std::env::var("SHOP_WALLET_LANG").unwrap_or_else(|_| defaults.lang.clone());
        let timeout = parse_timeout(std::env::var("SHOP_WALLET_TIMEOUT_MS").ok());
        Self { endpoint, partner_code, access_key, secret_key, redirect_url, ipn_url, request_type, lang, timeout }
    }
}

fn parse_timeout(value: Option<String>) -> Duration {
    let ms = match value {
        None => DEFAULT_TIMEOUT_MS,
        Some(s) => s.trim().parse::<u64>().ok().filter(|ms| *ms > 0).unwrap_or_else(|| {
            warn!("🪛️ {s} is not a valid value for SHOP_WALLET_TIMEOUT_MS. Using {DEFAULT_TIMEOUT_MS} ms.");
            DEFAULT_TIMEOUT_MS
        }),
    };
    Duration::from_millis(ms)
}
