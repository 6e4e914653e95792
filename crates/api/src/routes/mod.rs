//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! All resource routes live under the `/api/v1` prefix.
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (verifies database)
//!
//! # Users
//! POST   /api/v1/users             - Register (sets credential cookie)
//! POST   /api/v1/users/login       - Login (sets credential cookie)
//! POST   /api/v1/users/logout      - Logout (clears credential cookie)
//! GET    /api/v1/users/profile     - Own profile (auth)
//! PUT    /api/v1/users/profile     - Update own profile (auth)
//! GET    /api/v1/users             - List users (admin)
//! GET    /api/v1/users/{id}        - One user (admin)
//! PUT    /api/v1/users/{id}        - Update user (admin)
//! DELETE /api/v1/users/{id}        - Delete user (admin)
//!
//! # Products
//! GET    /api/v1/products          - Paged listing (?limit&skip&search)
//! GET    /api/v1/products/top      - Top-rated products
//! GET    /api/v1/products/{id}     - Product detail
//! POST   /api/v1/products          - Create product (admin)
//! PUT    /api/v1/products/{id}     - Update product (admin)
//! DELETE /api/v1/products/{id}     - Delete product (admin)
//! POST   /api/v1/products/reviews/{id} - Add review (auth)
//!
//! # Orders
//! POST   /api/v1/orders            - Place order (auth)
//! GET    /api/v1/orders/my-orders  - Own orders (auth)
//! GET    /api/v1/orders/{id}       - One order (owner or admin)
//! PUT    /api/v1/orders/{id}/pay   - Mark paid (owner or admin)
//! PUT    /api/v1/orders/{id}/deliver - Mark delivered (admin)
//! GET    /api/v1/orders            - All orders (admin)
//!
//! # Payment
//! GET    /api/v1/payment/razorpay/config         - Checkout config (key id only)
//! POST   /api/v1/payment/razorpay/order          - Create gateway order (auth)
//! POST   /api/v1/payment/razorpay/order/validate - Verify callback signature
//! ```

pub mod orders;
pub mod payment;
pub mod products;
pub mod users;

use axum::http::{StatusCode, Uri};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list_users))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route(
            "/profile",
            get(users::profile).put(users::update_profile),
        )
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/top", get(products::top))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/reviews/{id}", post(products::create_review))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create_order).get(orders::list_orders))
        .route("/my-orders", get(orders::my_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/pay", put(orders::pay_order))
        .route("/{id}/deliver", put(orders::deliver_order))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/razorpay/config", get(payment::config))
        .route("/razorpay/order", post(payment::create_order))
        .route("/razorpay/order/validate", post(payment::validate))
}

/// Create the complete application router (without the health endpoints).
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/payment", payment_routes());

    Router::new().nest("/api/v1", api).fallback(not_found)
}

/// JSON 404 for unmatched paths.
async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Not Found - {uri}") })),
    )
}
