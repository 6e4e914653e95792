//! Integration tests for the authentication gate.
//!
//! These tests require a running API server (cargo run -p bramble-api)
//! with a migrated database.
//!
//! Run with: cargo test -p bramble-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use bramble_integration_tests::{api_base_url, client, unique_email};

// ============================================================================
// Credential Checks
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_no_credential_is_unauthorized() {
    let base_url = api_base_url();

    let resp = client()
        .get(format!("{base_url}/api/v1/users/profile"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_garbage_credential_is_unauthorized() {
    let base_url = api_base_url();

    let resp = client()
        .get(format!("{base_url}/api/v1/users/profile"))
        .header("Cookie", "jwt=definitely-not-a-token")
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_non_admin_cannot_list_users() {
    let base_url = api_base_url();
    let http = client();

    // Register an ordinary (non-admin) account; the cookie store keeps
    // the credential for the follow-up request.
    let resp = http
        .post(format!("{base_url}/api/v1/users"))
        .json(&json!({
            "name": "Ordinary Shopper",
            "email": unique_email("shopper"),
            "password": "correct horse battery",
        }))
        .send()
        .await
        .expect("register failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = http
        .get(format!("{base_url}/api/v1/users"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_rejects_wrong_password() {
    let base_url = api_base_url();
    let http = client();
    let email = unique_email("shopper");

    let resp = http
        .post(format!("{base_url}/api/v1/users"))
        .json(&json!({
            "name": "Ordinary Shopper",
            "email": email,
            "password": "correct horse battery",
        }))
        .send()
        .await
        .expect("register failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client()
        .post(format!("{base_url}/api/v1/users/login"))
        .json(&json!({
            "email": email,
            "password": "wrong password",
        }))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_never_returns_password() {
    let base_url = api_base_url();

    let resp = client()
        .post(format!("{base_url}/api/v1/users"))
        .json(&json!({
            "name": "Ordinary Shopper",
            "email": unique_email("shopper"),
            "password": "correct horse battery",
        }))
        .send()
        .await
        .expect("register failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("json body");

    assert!(body.get("_id").is_some());
    assert_eq!(body["isAdmin"], json!(false));
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}
