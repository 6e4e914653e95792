//! Integration tests for Bramble.
//!
//! # Running Tests
//!
//! These tests drive a running API server over HTTP:
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p bramble-cli -- migrate
//!
//! # Start the API
//! cargo run -p bramble-api
//!
//! # Run integration tests (ignored by default)
//! cargo test -p bramble-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Base URL of the running API (default: `http://localhost:5000`)
//! - `RAZORPAY_KEY_SECRET` - Gateway key secret, for signing simulated
//!   payment callbacks (must match the server's)

#![cfg_attr(not(test), forbid(unsafe_code))]

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Create an HTTP client with a cookie store, so the credential cookie
/// set at login rides along on subsequent requests.
///
/// # Panics
///
/// Panics if the client cannot be built (test-only code).
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email per test run, so re-runs don't collide on the unique
/// email constraint.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4())
}

/// Sign a simulated gateway callback the way the gateway would:
/// hex HMAC-SHA256 over `"{order_id}|{payment_id}"` with the key secret.
///
/// # Panics
///
/// Panics if `RAZORPAY_KEY_SECRET` is unset (test-only code).
#[must_use]
pub fn sign_callback(order_id: &str, payment_id: &str) -> String {
    let secret = std::env::var("RAZORPAY_KEY_SECRET")
        .expect("RAZORPAY_KEY_SECRET must be set for payment tests");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("valid key length");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());

    hex::encode(mac.finalize().into_bytes())
}
