//! Request and notification signing.
//!
//! The provider signs an alphabetically ordered `key=value&key=value` string with HMAC-SHA256 using the merchant's
//! secret key, and transmits the MAC as lower-case hex. The same scheme is used in both directions.
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::WalletGatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Builds the canonical string that gets signed. Fields are sorted by key, so the caller may supply them in any
/// order.
pub fn canonical_string<K: AsRef<str>, V: AsRef<str>>(fields: &[(K, V)]) -> String {
    let mut pairs = fields.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect::<Vec<_>>();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

fn mac(secret: &str) -> Result<HmacSha256, WalletGatewayError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| WalletGatewayError::Initialization(e.to_string()))
}

/// Returns the hex-encoded HMAC-SHA256 of `payload` keyed with `secret`.
pub fn sign(secret: &str, payload: &str) -> Result<String, WalletGatewayError> {
    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex-encoded signature in constant time.
pub fn verify(secret: &str, payload: &str, signature: &str) -> Result<(), WalletGatewayError> {
    let expected = hex::decode(signature).map_err(|_| WalletGatewayError::InvalidSignature)?;
    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).map_err(|_| WalletGatewayError::InvalidSignature)
}
