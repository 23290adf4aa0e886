//! Review API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::auth::{optional_auth, require_auth};
use crate::core::ServerState;

/// Review router
pub fn router(state: &ServerState) -> Router<ServerState> {
    // 列表公开；带令牌时当前用户的评论排最前
    let public = Router::new()
        .route("/api/reviews", get(handler::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let protected = Router::new()
        .route("/api/reviews", put(handler::upsert))
        .route("/api/reviews", delete(handler::delete_review))
        .route("/api/reviews/can-review", get(handler::can_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected)
}
