//! Payment gateway client.
//!
//! Creates gateway orders over the Razorpay-style REST API and verifies
//! the signed client-side callback. The signature check is the one
//! security-critical invariant in the service: HMAC-SHA256 over
//! `"{order_id}|{payment_id}"` with the key secret, hex-encoded, compared
//! in constant time.

mod error;

pub use error::PaymentError;

use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Options forwarded to the gateway when creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayOrderRequest {
    /// Amount in the smallest currency unit (e.g. paise).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Caller-chosen receipt identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

/// The gateway's order (payment intent) object.
///
/// Unknown gateway fields are ignored; these are the ones the storefront
/// consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Opaque gateway order id.
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    pub status: String,
}

/// Payment gateway API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    api_base: String,
    key_id: String,
    key_secret: SecretString,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("api_base", &self.api_base)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl PaymentClient {
    /// Create a new gateway client from configuration.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.clone(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    /// The public key id, safe to hand to the client for checkout.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create an order (payment intent) at the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Gateway`] if the request cannot be made, or
    /// [`PaymentError::GatewayStatus`] if the gateway rejects it.
    #[instrument(skip(self), fields(amount = request.amount, currency = %request.currency))]
    pub async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, PaymentError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.api_base))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::GatewayStatus {
                status: status.as_u16(),
                body,
            });
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        debug!(order_id = %order.id, "Gateway order created");

        Ok(order)
    }

    /// Verify a client-side payment callback.
    ///
    /// Recomputes the expected signature over the gateway order id and
    /// payment id and compares it byte-for-byte in constant time. A
    /// mismatch is a hard failure; nothing partially succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidSignature`] on mismatch.
    #[instrument(skip(self, signature))]
    pub fn verify_callback(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let expected = compute_signature(order_id, payment_id, &self.key_secret)?;

        if !constant_time_compare(&expected, signature) {
            return Err(PaymentError::InvalidSignature);
        }

        debug!(order_id, payment_id, "Payment signature verified");

        Ok(())
    }
}

/// Compute the callback signature: hex HMAC-SHA256 of `"{order_id}|{payment_id}"`.
fn compute_signature(
    order_id: &str,
    payment_id: &str,
    key_secret: &SecretString,
) -> Result<String, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(key_secret.expose_secret().as_bytes())
        .map_err(|_| PaymentError::InvalidKey)?;

    mac.update(format!("{order_id}|{payment_id}").as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PaymentClient {
        PaymentClient::new(&PaymentConfig {
            api_base: "https://api.razorpay.com".to_string(),
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from("test-key-secret"),
        })
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_signature_is_hex_sha256_sized() {
        let secret = SecretString::from("test-key-secret");
        let sig = compute_signature("order_abc", "pay_123", &secret).expect("sign");
        assert_eq!(sig.len(), 64);
        assert!(sig.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_accepts_genuine_signature() {
        let client = client();
        let sig = compute_signature("order_abc", "pay_123", &client.key_secret).expect("sign");
        assert!(client.verify_callback("order_abc", "pay_123", &sig).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let client = client();
        let sig = compute_signature("order_abc", "pay_123", &client.key_secret).expect("sign");

        // Flip the last hex digit
        let mut tampered = sig.clone();
        let last = tampered.pop().expect("nonempty");
        tampered.push(if last == '0' { '1' } else { '0' });

        assert!(matches!(
            client.verify_callback("order_abc", "pay_123", &tampered),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_verify_rejects_signature_for_other_payment() {
        let client = client();
        let sig = compute_signature("order_abc", "pay_123", &client.key_secret).expect("sign");
        assert!(matches!(
            client.verify_callback("order_abc", "pay_999", &sig),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_verify_rejects_arbitrary_strings() {
        let client = client();
        let zeros = "0".repeat(64);
        for junk in ["", "deadbeef", "not-a-signature", zeros.as_str()] {
            assert!(matches!(
                client.verify_callback("order_abc", "pay_123", junk),
                Err(PaymentError::InvalidSignature)
            ));
        }
    }
}
