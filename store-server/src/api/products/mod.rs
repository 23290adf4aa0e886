//! Product API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

/// Product router
pub fn router(state: &ServerState) -> Router<ServerState> {
    // 目录浏览是公开的
    let public = Router::new()
        .route("/api/products", get(handler::list))
        .route("/api/products/{id}", get(handler::get_by_id));

    // 目录管理仅限管理员
    let admin = Router::new()
        .route("/api/admin/products", post(handler::create))
        .route("/api/admin/products/{id}", put(handler::update))
        .route("/api/admin/products/{id}", delete(handler::delete_product))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
