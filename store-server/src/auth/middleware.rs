//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件。路由按模块分层：公开路由不挂
//! 中间件，受保护路由挂 [`require_auth`]，管理员路由再加 [`require_admin`]。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use shared::AppError;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match bearer_token(&req) {
        Some(token) => token,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without credentials");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(uri = %req.uri(), error = %e, "Authentication failed");
            match e {
                crate::auth::jwt::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 可选认证中间件 - 公开路由上尽力识别用户
///
/// 带有效令牌时注入 [`CurrentUser`]，否则不注入也不报错。
/// 用于公开的评论列表（当前用户的评论排在最前）。
pub async fn optional_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req)
        && let Ok(claims) = state.jwt_service.validate_token(token)
    {
        req.extensions_mut().insert(CurrentUser::from(claims));
    }
    next.run(req).await
}

/// 管理员中间件 - 要求管理员角色
///
/// 检查 `CurrentUser.role == Role::Admin`，须挂在 [`require_auth`] 之后。
///
/// # 错误
///
/// 非管理员返回 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;

    if !user.is_admin() {
        tracing::warn!(
            user_id = %user.id,
            username = %user.username,
            uri = %req.uri(),
            "Admin route denied"
        );
        return Err(AppError::new(shared::ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}
