//! Order route handlers: checkout, payment and delivery transitions.
//!
//! The money fields of a new order are recomputed server-side from the
//! submitted line items under the configured pricing policy — the totals
//! a client sends are never trusted.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bramble_core::{OrderId, PaymentMethod, ProductId, ShippingAddress, UserId};

use crate::db::orders::{NewOrder, OrderRepository, OrderWithCustomer};
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireAdmin, RequireUser};
use crate::models::order::{Order, OrderItem, PaymentResult, Transition};
use crate::models::user::User;
use crate::state::AppState;

/// One line of a checkout request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItemInput {
    pub product: ProductId,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: i32,
}

/// Checkout request body: the cart snapshot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub order_items: Vec<OrderItemInput>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Payment transition body: the gateway's payment result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PayOrderRequest {
    /// Gateway transaction (payment) id.
    pub id: String,
    pub status: String,
    pub update_time: DateTime<Utc>,
    pub email_address: Option<String>,
    /// Amount actually paid; must equal the order total.
    pub amount: Decimal,
}

impl From<PayOrderRequest> for PaymentResult {
    fn from(body: PayOrderRequest) -> Self {
        Self {
            id: body.id,
            status: body.status,
            update_time: body.update_time,
            email_address: body.email_address,
            amount: body.amount,
        }
    }
}

/// API shape of an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user: UserId,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user: order.user_id,
            order_items: order.items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            items_price: order.items_price,
            shipping_price: order.shipping_price,
            tax_price: order.tax_price,
            total_price: order.total_price,
            is_paid: order.is_paid,
            paid_at: order.paid_at,
            is_delivered: order.is_delivered,
            delivered_at: order.delivered_at,
            payment_result: order.payment_result,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Customer summary embedded in the admin order listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomerResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Admin listing entry: the order with its customer resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub customer: OrderCustomerResponse,
}

impl From<OrderWithCustomer> for AdminOrderResponse {
    fn from(entry: OrderWithCustomer) -> Self {
        let customer = OrderCustomerResponse {
            id: entry.order.user_id,
            name: entry.customer_name,
            email: entry.customer_email,
        };

        Self {
            order: entry.order.into(),
            customer,
        }
    }
}

/// `POST /api/v1/orders` — snapshot the cart into a `Created` order.
#[instrument(skip(state, user, body))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    if body.order_items.is_empty() {
        return Err(AppError::Validation("no order items".to_owned()));
    }

    let mut items = Vec::with_capacity(body.order_items.len());
    let mut lines = Vec::with_capacity(body.order_items.len());
    for input in body.order_items {
        let qty = u32::try_from(input.qty)
            .ok()
            .filter(|&q| q > 0)
            .ok_or_else(|| {
                AppError::Validation(format!("invalid quantity for product {}", input.product))
            })?;
        if input.price < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "invalid price for product {}",
                input.product
            )));
        }

        lines.push((input.price, qty));
        items.push(OrderItem {
            product: input.product,
            name: input.name,
            image: input.image,
            price: input.price,
            qty: input.qty,
        });
    }

    let totals = state.pricing().price_lines(lines);

    let order = OrderRepository::new(state.pool())
        .create(&NewOrder {
            user_id: user.id,
            items,
            shipping_address: body.shipping_address,
            payment_method: body.payment_method,
            totals,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// `GET /api/v1/orders/my-orders` — the caller's orders, newest first.
#[instrument(skip(state, user))]
pub async fn my_orders(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(user.id)
        .await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// `GET /api/v1/orders/{id}` — one order, for its owner or an admin.
#[instrument(skip(state, user))]
pub async fn get_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>> {
    let order = fetch_order_for(&state, &user, OrderId::new(id)).await?;
    Ok(Json(order.into()))
}

/// `PUT /api/v1/orders/{id}/pay` — apply a verified payment result.
///
/// Idempotent for the payment that already paid the order; a different
/// payment id conflicts, and a mismatched amount is rejected outright.
#[instrument(skip(state, user, body))]
pub async fn pay_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<PayOrderRequest>,
) -> Result<Json<OrderResponse>> {
    let order = fetch_order_for(&state, &user, OrderId::new(id)).await?;
    let result = PaymentResult::from(body);

    match order.decide_payment(&result)? {
        Transition::AlreadyApplied => Ok(Json(order.into())),
        Transition::Apply => {
            let updated = OrderRepository::new(state.pool())
                .mark_paid(order.id, &result)
                .await?;
            Ok(Json(updated.into()))
        }
    }
}

/// `PUT /api/v1/orders/{id}/deliver` — mark delivered (admin).
///
/// Rejected while the order is unpaid, regardless of what the UI shows.
#[instrument(skip(state, _admin))]
pub async fn deliver_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get_by_id(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    match order.decide_delivery()? {
        Transition::AlreadyApplied => Ok(Json(order.into())),
        Transition::Apply => {
            let updated = repo.mark_delivered(order.id).await?;
            Ok(Json(updated.into()))
        }
    }
}

/// `GET /api/v1/orders` — all orders with their customers (admin).
#[instrument(skip_all)]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminOrderResponse>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Fetch an order, restricted to its owner unless the caller is admin.
///
/// Another user's order answers 404 rather than 401, so order ids are
/// not probeable.
async fn fetch_order_for(state: &AppState, user: &User, id: OrderId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    Ok(order)
}
