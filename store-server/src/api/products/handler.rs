//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use shared::{ApiResponse, AppError, AppResult, ErrorCode, Paginated};

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{ProductRepository, product::CatalogFilter};
use crate::services::release_images;

/// Catalog query parameters: free-text keyword, price range, page
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub keyword: Option<String>,
    #[serde(rename = "price[gte]")]
    pub price_gte: Option<f64>,
    #[serde(rename = "price[lte]")]
    pub price_lte: Option<f64>,
    pub page: Option<u32>,
}

/// GET /api/products - 商品列表（关键字 / 价格区间 / 固定页大小分页）
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Product>>>> {
    let repo = ProductRepository::new(state.get_db());

    let filter = CatalogFilter {
        keyword: query.keyword.filter(|k| !k.trim().is_empty()),
        price_gte: query.price_gte,
        price_lte: query.price_lte,
    };
    let page = query.page.unwrap_or(1).max(1);
    let page_size = state.config.catalog_page_size;

    let (products, total) = repo.search(&filter, page, page_size).await?;

    Ok(Json(ApiResponse::success(Paginated::new(
        products, page, page_size, total,
    ))))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(Json(ApiResponse::success(product)))
}

/// POST /api/admin/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(payload).await?;

    tracing::info!(
        product = %product.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        name = %product.name,
        "Product created"
    );

    Ok(Json(ApiResponse::success(product)))
}

/// PUT /api/admin/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, payload).await?;

    Ok(Json(ApiResponse::success(product)))
}

/// DELETE /api/admin/products/:id - 删除商品
///
/// 图片释放是尽力而为的调用方责任，与删除不在同一事务
pub async fn delete_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = ProductRepository::new(state.get_db());
    let deleted = repo.delete(&id).await?;

    release_images(state.blob_store.as_ref(), &deleted.images).await;

    tracing::info!(product = %id, "Product deleted");

    Ok(Json(ApiResponse::ok()))
}
