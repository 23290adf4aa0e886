//! User Administration API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

/// User admin router
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/admin/users", get(handler::list))
        .route("/api/admin/users/{id}/deactivate", put(handler::deactivate))
        .route("/api/admin/users/{id}/reactivate", put(handler::reactivate))
        .route("/api/admin/users/{id}", delete(handler::delete_user))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
