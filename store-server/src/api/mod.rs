//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口（注册、登录、联合登录）
//! - [`products`] - 商品目录接口
//! - [`orders`] - 订单接口
//! - [`reviews`] - 商品评论接口
//! - [`reports`] - 管理员报表接口
//! - [`users`] - 用户管理接口
//! - [`upload`] - 图片上传接口
//!
//! 路由按模块分层：公开路由不挂中间件，受保护路由挂 `require_auth`，
//! 管理员路由再加 `require_admin`。

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod reports;
pub mod reviews;
pub mod upload;
pub mod users;

/// Build a router with all routes registered
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(products::router(state))
        .merge(orders::router(state))
        .merge(reviews::router(state))
        .merge(reports::router(state))
        .merge(users::router(state))
        .merge(upload::router(state))
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router(&state)
        // CORS - handle cross-origin requests from the storefront
        .layer(CorsLayer::permissive())
        // Gzip compress responses
        .layer(CompressionLayer::new())
        // Per-request trace logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
