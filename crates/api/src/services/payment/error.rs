//! Payment gateway errors.

use thiserror::Error;

/// Errors that can occur when interacting with the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request to the gateway failed.
    #[error("gateway request failed: {0}")]
    Gateway(String),

    /// The gateway answered with a non-success status.
    #[error("gateway returned status {status}: {body}")]
    GatewayStatus {
        /// HTTP status code from the gateway.
        status: u16,
        /// Response body, for server-side logs only.
        body: String,
    },

    /// Callback signature did not match the recomputed HMAC.
    #[error("payment signature mismatch")]
    InvalidSignature,

    /// The key secret could not be used as an HMAC key.
    #[error("invalid gateway key material")]
    InvalidKey,
}
