//! Reporting API Module
//!
//! Read-only sales aggregates. All routes are admin-gated.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

/// Reporting router
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/admin/reports/total-orders", get(handler::total_orders))
        .route("/api/admin/reports/total-sales", get(handler::total_sales))
        .route(
            "/api/admin/reports/customer-sales",
            get(handler::customer_sales),
        )
        .route(
            "/api/admin/reports/sales-per-month",
            get(handler::sales_per_month),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
