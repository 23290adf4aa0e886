//! Order API Module
//!
//! Checkout and order queries for customers; status management and hard
//! delete for admins. All mutations go through the OrderManager.

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

/// Order router
pub fn router(state: &ServerState) -> Router<ServerState> {
    let protected = Router::new()
        .route("/api/orders", post(handler::create))
        .route("/api/orders/me", get(handler::my_orders))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/admin/orders", get(handler::list_all))
        .route("/api/admin/orders/{id}", put(handler::update_status))
        .route("/api/admin/orders/{id}", delete(handler::delete_order))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    protected.merge(admin)
}
