//! Product catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bramble_core::{ProductId, UserId};

/// A customer review, embedded in the product document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Reviewing user.
    pub user: UserId,
    /// Reviewer display name at review time.
    pub name: String,
    /// Star rating, 1-5.
    pub rating: i32,
    /// Free-text comment.
    pub comment: String,
    /// When the review was written.
    pub created_at: DateTime<Utc>,
}

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Units currently in stock; bounds cart quantities at add-time.
    pub count_in_stock: i32,
    /// Mean of review ratings; zero when unreviewed.
    pub rating: f64,
    /// Number of reviews, kept in step with `reviews`.
    pub num_reviews: i32,
    /// Embedded reviews, oldest first.
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i32,
}

/// Partial update to a product; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub count_in_stock: Option<i32>,
}

/// Recompute the aggregate rating fields from a review list.
///
/// Returns `(rating, num_reviews)` where `rating` is the arithmetic mean
/// of the review ratings, or zero for an empty list.
#[must_use]
pub fn aggregate_rating(reviews: &[Review]) -> (f64, i32) {
    if reviews.is_empty() {
        return (0.0, 0);
    }

    let sum: i32 = reviews.iter().map(|r| r.rating).sum();
    #[allow(clippy::cast_precision_loss)] // Review counts stay far below f64 precision
    let mean = f64::from(sum) / reviews.len() as f64;

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    (mean, reviews.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(user: i32, rating: i32) -> Review {
        Review {
            user: UserId::new(user),
            name: format!("User {user}"),
            rating,
            comment: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_aggregate_rating_empty() {
        assert_eq!(aggregate_rating(&[]), (0.0, 0));
    }

    #[test]
    fn test_aggregate_rating_mean() {
        let (rating, count) = aggregate_rating(&[review(1, 4), review(2, 5), review(3, 3)]);
        assert!((rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(count, 3);
    }
}
