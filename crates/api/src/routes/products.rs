//! Product catalog route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use bramble_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireAdmin, RequireUser};
use crate::models::product::{NewProduct, Product, ProductChanges, Review};
use crate::state::AppState;

/// Default page size for the catalog listing.
const DEFAULT_PAGE_SIZE: i64 = 8;

/// Largest page a single request may ask for.
const MAX_PAGE_SIZE: i64 = 50;

/// Number of products on the top-rated shelf.
const TOP_PRODUCTS: i64 = 3;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    pub search: Option<String>,
}

/// Product creation body (admin).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductRequest {
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i32,
}

/// Product update body (admin); omitted fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub count_in_stock: Option<i32>,
}

/// Review creation body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: String,
}

/// API shape of a product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i32,
    pub rating: f64,
    pub num_reviews: i32,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            image: product.image,
            brand: product.brand,
            category: product.category,
            description: product.description,
            price: product.price,
            count_in_stock: product.count_in_stock,
            rating: product.rating,
            num_reviews: product.num_reviews,
            reviews: product.reviews,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// One catalog page with the unpaged total.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: i64,
}

/// `GET /api/v1/products?limit&skip&search` — paged catalog listing.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let skip = query.skip.unwrap_or(0).max(0);
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let page = ProductRepository::new(state.pool())
        .list(limit, skip, search)
        .await?;

    Ok(Json(ProductListResponse {
        products: page.products.into_iter().map(Into::into).collect(),
        total: page.total,
    }))
}

/// `GET /api/v1/products/top` — the highest-rated products.
#[instrument(skip(state))]
pub async fn top(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.pool())
        .top_rated(TOP_PRODUCTS)
        .await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// `GET /api/v1/products/{id}` — product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product.into()))
}

/// `POST /api/v1/products` — create a product (admin).
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    JsonBody(body): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    validate_price(Some(body.price))?;
    validate_stock(Some(body.count_in_stock))?;

    let new = NewProduct {
        name: body.name,
        image: body.image,
        brand: body.brand,
        category: body.category,
        description: body.description,
        price: body.price,
        count_in_stock: body.count_in_stock,
    };

    let product = ProductRepository::new(state.pool()).create(&new).await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /api/v1/products/{id}` — update a product (admin).
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    validate_price(body.price)?;
    validate_stock(body.count_in_stock)?;

    let changes = ProductChanges {
        name: body.name,
        image: body.image,
        brand: body.brand,
        category: body.category,
        description: body.description,
        price: body.price,
        count_in_stock: body.count_in_stock,
    };

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &changes)
        .await?;

    Ok(Json(product.into()))
}

/// `DELETE /api/v1/products/{id}` — delete a product (admin).
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    Ok(Json(json!({ "message": "product removed" })))
}

/// `POST /api/v1/products/reviews/{id}` — add a review (authenticated).
///
/// One review per user per product; a second attempt conflicts.
#[instrument(skip(state, user, body))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_owned(),
        ));
    }

    let review = Review {
        user: user.id,
        name: user.name,
        rating: body.rating,
        comment: body.comment,
        created_at: Utc::now(),
    };

    let product = ProductRepository::new(state.pool())
        .add_review(ProductId::new(id), review)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => AppError::Database(other),
        })?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Reject negative prices.
fn validate_price(price: Option<Decimal>) -> Result<()> {
    if price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::Validation("price cannot be negative".to_owned()));
    }
    Ok(())
}

/// Reject negative stock counts.
fn validate_stock(count_in_stock: Option<i32>) -> Result<()> {
    if count_in_stock.is_some_and(|s| s < 0) {
        return Err(AppError::Validation(
            "stock count cannot be negative".to_owned(),
        ));
    }
    Ok(())
}
