//! Order API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;

use shared::client::UserInfo;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatusUpdate};
use crate::db::repository::{OrderRepository, UserRepository, make_record_id};

/// Order with its user populated (admin/detail view)
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    /// The ordering user; absent if the account was deleted since
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

/// Admin listing: all orders plus the aggregate total
#[derive(Debug, Serialize)]
pub struct AdminOrders {
    pub orders: Vec<Order>,
    pub total_amount: f64,
}

/// POST /api/orders - 下单
///
/// 库存同步扣减；通知链路尽力而为，其结果不影响本响应
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let user_rid = make_record_id("user", &current.id);
    let manager = state.order_manager();

    let (order, _outcome) = manager.place_order(&user_rid, payload).await?;

    tracing::info!(
        order = %order.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        user = %current.id,
        total = order.total_price,
        "Order placed"
    );

    Ok(Json(ApiResponse::success(order)))
}

/// GET /api/orders/me - 当前用户的订单
pub async fn my_orders(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let repo = OrderRepository::new(state.get_db());
    let user_rid = make_record_id("user", &current.id);
    let orders = repo.find_by_user(&user_rid).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/orders/:id - 单个订单（含下单用户）
///
/// 仅订单所有者或管理员可见
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    let owner_id = order.user.to_string();
    if owner_id != current.id && !current.is_admin() {
        return Err(AppError::forbidden("Not your order"));
    }

    let users = UserRepository::new(state.get_db());
    let user_info = users
        .find_by_id(&owner_id)
        .await?
        .map(UserInfo::from);

    Ok(Json(ApiResponse::success(OrderDetail { order, user_info })))
}

/// GET /api/admin/orders - 全部订单 + 总金额
pub async fn list_all(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<AdminOrders>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_all().await?;
    let total_amount = repo.sum_total().await?;

    Ok(Json(ApiResponse::success(AdminOrders {
        orders,
        total_amount,
    })))
}

/// PUT /api/admin/orders/:id - 状态更新
///
/// 终态订单（已送达/已取消）返回 409
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let manager = state.order_manager();
    let (order, _outcome) = manager.update_status(&id, payload.status).await?;

    tracing::info!(order = %id, status = ?order.status, "Order status updated");

    Ok(Json(ApiResponse::success(order)))
}

/// DELETE /api/admin/orders/:id - 硬删除
pub async fn delete_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let manager = state.order_manager();
    manager.delete_order(&id).await?;

    tracing::info!(order = %id, "Order deleted");

    Ok(Json(ApiResponse::ok()))
}
