//! Review API Handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, Review};
use crate::db::repository::{ProductRepository, UserRepository, make_record_id};
use crate::reviews::{CanReview, ReviewInput};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Product id
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CanReviewQuery {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub product_id: String,
    /// Review id
    pub id: String,
}

/// Hide the display name of reviews marked anonymous
fn masked(mut review: Review) -> Review {
    if review.anonymous {
        review.name = "Anonymous".to_string();
    }
    review
}

/// GET /api/reviews?id= - 商品评论列表
///
/// 已登录用户自己的评论排在最前
pub async fn list(
    State(state): State<ServerState>,
    current: Option<Extension<CurrentUser>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Review>>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&query.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let mut reviews = product.reviews;
    if let Some(Extension(current)) = current {
        let caller = make_record_id("user", &current.id);
        reviews.sort_by_key(|r| r.reviewer != caller);
    }

    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(masked).collect(),
    )))
}

/// PUT /api/reviews - 新增或覆盖自己的评论
///
/// 前提：用户持有包含该商品的已送达订单（403 否则）
pub async fn upsert(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ReviewInput>,
) -> AppResult<Json<ApiResponse<Product>>> {
    // Display name comes from the account, not the token
    let users = UserRepository::new(state.get_db());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let reviewer = make_record_id("user", &current.id);
    let aggregator = state.review_aggregator();
    let product = aggregator
        .upsert_review(&reviewer, &user.name, payload)
        .await?;

    Ok(Json(ApiResponse::success(product)))
}

/// GET /api/reviews/can-review?product_id= - 资格与已有评论探测
pub async fn can_review(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<CanReviewQuery>,
) -> AppResult<Json<ApiResponse<CanReview>>> {
    let user = make_record_id("user", &current.id);
    let aggregator = state.review_aggregator();
    let probe = aggregator.can_review(&query.product_id, &user).await?;
    Ok(Json(ApiResponse::success(probe)))
}

/// DELETE /api/reviews?product_id=&id= - 删除评论（本人或管理员）
pub async fn delete_review(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let caller = make_record_id("user", &current.id);
    let aggregator = state.review_aggregator();
    let product = aggregator
        .delete_review(&query.product_id, &query.id, &caller, current.is_admin())
        .await?;

    Ok(Json(ApiResponse::success(product)))
}
