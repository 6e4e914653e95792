//! Product repository for database operations.
//!
//! Reviews are embedded in the product row as JSONB, mirroring the
//! document shape the catalog had originally. The aggregate rating
//! fields are recomputed whenever the review list changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bramble_core::ProductId;

use super::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductChanges, Review, aggregate_rating};

/// One page of the catalog plus the unpaged total.
#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
}

/// Database row shape for a product.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    image: String,
    brand: String,
    category: String,
    description: String,
    price: Decimal,
    count_in_stock: i32,
    rating: f64,
    num_reviews: i32,
    reviews: Json<Vec<Review>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            image: self.image,
            brand: self.brand,
            category: self.category,
            description: self.description,
            price: self.price,
            count_in_stock: self.count_in_stock,
            rating: self.rating,
            num_reviews: self.num_reviews,
            reviews: self.reviews.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, image, brand, category, description, price, \
     count_in_stock, rating, num_reviews, reviews, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one catalog page, newest first, with the unpaged total.
    ///
    /// `search` filters by case-insensitive substring match on the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        limit: i64,
        skip: i64,
        search: Option<&str>,
    ) -> Result<ProductPage, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products \
             WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')",
        )
        .bind(search)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(search)
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        Ok(ProductPage {
            products: rows.into_iter().map(ProductRow::into_product).collect(),
            total,
        })
    }

    /// The `limit` highest-rated products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rating DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProductRow::into_product))
    }

    /// Create a new product with no reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
                 (name, image, brand, category, description, price, count_in_stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.image)
        .bind(&new.brand)
        .bind(&new.category)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.count_in_stock)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_product())
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 image = COALESCE($3, image), \
                 brand = COALESCE($4, brand), \
                 category = COALESCE($5, category), \
                 description = COALESCE($6, description), \
                 price = COALESCE($7, price), \
                 count_in_stock = COALESCE($8, count_in_stock), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(changes.name.as_deref())
        .bind(changes.image.as_deref())
        .bind(changes.brand.as_deref())
        .bind(changes.category.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.count_in_stock)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product)
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a review and recompute the aggregate rating fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if this user already reviewed
    /// the product.
    pub async fn add_review(
        &self,
        id: ProductId,
        review: Review,
    ) -> Result<Product, RepositoryError> {
        let Some(product) = self.get_by_id(id).await? else {
            return Err(RepositoryError::NotFound);
        };

        if product.reviews.iter().any(|r| r.user == review.user) {
            return Err(RepositoryError::Conflict(
                "product already reviewed".to_owned(),
            ));
        }

        let mut reviews = product.reviews;
        reviews.push(review);
        let (rating, num_reviews) = aggregate_rating(&reviews);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
                 reviews = $2, rating = $3, num_reviews = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(Json(&reviews))
        .bind(rating)
        .bind(num_reviews)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product)
            .ok_or(RepositoryError::NotFound)
    }
}
