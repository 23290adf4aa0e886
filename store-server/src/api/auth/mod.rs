//! Auth API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_auth;
use crate::core::ServerState;

/// Auth router
pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/federated", post(handler::federated));

    let protected = Router::new()
        .route("/api/auth/me", get(handler::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected)
}
