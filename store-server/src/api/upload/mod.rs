//! Upload API Module

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_auth;
use crate::core::ServerState;

/// Upload router
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/upload", post(handler::upload))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
