//! Review Aggregator
//!
//! Maintains the derived rating / review-count pair on a product whenever
//! its review set changes. The recomputation is a pure function applied
//! inside the same document write as the mutation, guarded by a
//! compare-and-swap on the product's revision counter.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use validator::Validate;

use serde::{Deserialize, Serialize};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};

use crate::db::models::{Product, Review};
use crate::db::repository::{OrderRepository, ProductRepository, make_record_id};

/// Bounded retry for the revision CAS; exhaustion means pathological
/// contention and surfaces as an internal error
const MAX_CAS_ATTEMPTS: usize = 3;

/// Review submission payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewInput {
    pub product_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Eligibility probe response
#[derive(Debug, Clone, Serialize)]
pub struct CanReview {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
}

/// Recompute the derived aggregate from the current review set.
///
/// Returns (rating, count): the arithmetic mean of all ratings, 0 when
/// the set is empty.
pub fn recompute_aggregate(reviews: &[Review]) -> (f64, i64) {
    let count = reviews.len() as i64;
    if count == 0 {
        return (0.0, 0);
    }
    let sum: i64 = reviews.iter().map(|r| r.rating as i64).sum();
    (sum as f64 / count as f64, count)
}

pub struct ReviewAggregator {
    products: ProductRepository,
    orders: OrderRepository,
}

impl ReviewAggregator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    /// Create or replace the caller's review of a product.
    ///
    /// Precondition: the reviewer holds a DELIVERED order containing the
    /// product - violations are authorization failures, not validation.
    /// A second submission by the same reviewer overwrites the existing
    /// entry in place (array position preserved).
    pub async fn upsert_review(
        &self,
        reviewer: &RecordId,
        reviewer_name: &str,
        input: ReviewInput,
    ) -> AppResult<Product> {
        input
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let product_rid = make_record_id("product", &input.product_id);

        let eligible = self
            .orders
            .has_delivered_containing(reviewer, &product_rid)
            .await
            .map_err(AppError::from)?;
        if !eligible {
            return Err(AppError::new(ErrorCode::ReviewNotEligible));
        }

        for _ in 0..MAX_CAS_ATTEMPTS {
            let product = self
                .products
                .find_by_id(&input.product_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

            let mut reviews = product.reviews.clone();
            match reviews.iter_mut().find(|r| &r.reviewer == reviewer) {
                Some(existing) => {
                    // 原地覆盖，数组位置保持不变
                    existing.rating = input.rating;
                    existing.comment = input.comment.clone();
                    existing.anonymous = input.anonymous;
                }
                None => {
                    reviews.push(Review {
                        id: uuid::Uuid::new_v4().to_string(),
                        reviewer: reviewer.clone(),
                        name: reviewer_name.to_string(),
                        rating: input.rating,
                        comment: input.comment.clone(),
                        anonymous: input.anonymous,
                        created_at: now_millis(),
                    });
                }
            }

            let (rating, count) = recompute_aggregate(&reviews);
            if let Some(updated) = self
                .products
                .compare_and_set_reviews(&product_rid, reviews, rating, count, product.revision)
                .await
                .map_err(AppError::from)?
            {
                return Ok(updated);
            }
            // Revision moved under us; reload and retry
        }

        Err(AppError::internal(
            "Concurrent review updates exhausted retries",
        ))
    }

    /// Delete a review. Authorized for the review's owner or an admin;
    /// the aggregate is recomputed in the same write.
    pub async fn delete_review(
        &self,
        product_id: &str,
        review_id: &str,
        caller: &RecordId,
        caller_is_admin: bool,
    ) -> AppResult<Product> {
        let product_rid = make_record_id("product", product_id);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let product = self
                .products
                .find_by_id(product_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

            let review = product
                .reviews
                .iter()
                .find(|r| r.id == review_id)
                .ok_or_else(|| AppError::new(ErrorCode::ReviewNotFound))?;

            if &review.reviewer != caller && !caller_is_admin {
                return Err(AppError::forbidden("Not the review's owner"));
            }

            let reviews: Vec<Review> = product
                .reviews
                .iter()
                .filter(|r| r.id != review_id)
                .cloned()
                .collect();

            let (rating, count) = recompute_aggregate(&reviews);
            if let Some(updated) = self
                .products
                .compare_and_set_reviews(&product_rid, reviews, rating, count, product.revision)
                .await
                .map_err(AppError::from)?
            {
                return Ok(updated);
            }
        }

        Err(AppError::internal(
            "Concurrent review updates exhausted retries",
        ))
    }

    /// Eligibility probe: may the user review this product, and do they
    /// already have a review on it?
    pub async fn can_review(&self, product_id: &str, user: &RecordId) -> AppResult<CanReview> {
        let product_rid = make_record_id("product", product_id);

        let product = self
            .products
            .find_by_id(product_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        let eligible = self
            .orders
            .has_delivered_containing(user, &product_rid)
            .await
            .map_err(AppError::from)?;

        let review = product.reviews.iter().find(|r| &r.reviewer == user).cloned();

        Ok(CanReview { eligible, review })
    }
}
