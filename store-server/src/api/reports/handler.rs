//! Reporting API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use shared::{ApiResponse, AppResult};

use crate::core::ServerState;
use crate::reporting::{CustomerSales, MonthlySales};

#[derive(Debug, Serialize)]
pub struct TotalOrders {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct TotalSales {
    pub total: f64,
}

/// GET /api/admin/reports/total-orders - 订单总数
pub async fn total_orders(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<TotalOrders>>> {
    let count = state.reporting().total_orders().await?;
    Ok(Json(ApiResponse::success(TotalOrders { count })))
}

/// GET /api/admin/reports/total-sales - 销售总额
pub async fn total_sales(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<TotalSales>>> {
    let total = state.reporting().total_sales().await?;
    Ok(Json(ApiResponse::success(TotalSales { total })))
}

/// GET /api/admin/reports/customer-sales - 每客户消费（降序）
pub async fn customer_sales(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<CustomerSales>>>> {
    let report = state.reporting().customer_sales().await?;
    Ok(Json(ApiResponse::success(report)))
}

/// GET /api/admin/reports/sales-per-month - 每月销售额（按支付时间）
pub async fn sales_per_month(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<MonthlySales>>>> {
    let report = state.reporting().sales_per_month().await?;
    Ok(Json(ApiResponse::success(report)))
}
