//! User Administration Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::client::UserInfo;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::core::ServerState;
use crate::db::models::Role;
use crate::db::repository::UserRepository;
use crate::services::release_images;

/// GET /api/admin/users - 用户列表
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<UserInfo>>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_all().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserInfo::from).collect(),
    )))
}

/// PUT /api/admin/users/:id/deactivate - 停用账号
///
/// 管理员账号不可停用
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if user.role == Role::Admin {
        return Err(AppError::new(ErrorCode::CannotDeactivateAdmin));
    }

    let user = repo.set_deactivated(&id, true).await?;

    tracing::info!(user = %id, "User deactivated");

    Ok(Json(ApiResponse::success(UserInfo::from(user))))
}

/// PUT /api/admin/users/:id/reactivate - 重新启用账号
pub async fn reactivate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.set_deactivated(&id, false).await?;

    tracing::info!(user = %id, "User reactivated");

    Ok(Json(ApiResponse::success(UserInfo::from(user))))
}

/// DELETE /api/admin/users/:id - 删除账号
///
/// 头像释放是尽力而为的调用方责任
pub async fn delete_user(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = UserRepository::new(state.get_db());
    let deleted = repo.delete(&id).await?;

    if let Some(avatar) = &deleted.avatar {
        release_images(state.blob_store.as_ref(), std::slice::from_ref(avatar)).await;
    }

    tracing::info!(user = %id, "User deleted");

    Ok(Json(ApiResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shared::util::now_millis;

    use crate::auth::{JwtConfig, JwtService};
    use crate::core::Config;
    use crate::db::DbService;
    use crate::db::models::User;
    use crate::services::{HttpBlobStore, HttpIdentityVerifier, HttpMailer, HttpReceiptRenderer};

    async fn test_state() -> ServerState {
        let svc = DbService::memory().await.expect("in-memory db");
        ServerState {
            config: Config::from_env(),
            db: svc.db,
            jwt_service: Arc::new(JwtService::with_config(JwtConfig {
                secret: "test-secret-key-at-least-32-chars-long!".to_string(),
                expiration_minutes: 60,
                issuer: "store-server".to_string(),
                audience: "store-clients".to_string(),
            })),
            identity: Arc::new(HttpIdentityVerifier::new("http://localhost:1")),
            blob_store: Arc::new(HttpBlobStore::new("http://localhost:1")),
            mailer: Arc::new(HttpMailer::new("http://localhost:1", "noreply@test")),
            renderer: Arc::new(HttpReceiptRenderer::new("http://localhost:1")),
        }
    }

    async fn seed_user(state: &ServerState, username: &str, role: Role) -> String {
        let repo = UserRepository::new(state.get_db());
        repo.create(User {
            id: None,
            subject: Some(format!("idp|{username}")),
            name: username.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: None,
            hash_pass: None,
            avatar: None,
            role,
            deactivated: false,
            created_at: now_millis(),
        })
        .await
        .unwrap()
        .id
        .unwrap()
        .to_string()
    }

    #[tokio::test]
    async fn test_deactivate_and_reactivate_user() {
        let state = test_state().await;
        let id = seed_user(&state, "alice", Role::User).await;

        let result = deactivate(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert!(result.0.data.unwrap().deactivated);

        let result = reactivate(State(state), Path(id)).await.unwrap();
        assert!(!result.0.data.unwrap().deactivated);
    }

    #[tokio::test]
    async fn test_admin_cannot_be_deactivated() {
        let state = test_state().await;
        let id = seed_user(&state, "root", Role::Admin).await;

        let err = deactivate(State(state.clone()), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotDeactivateAdmin);

        // Untouched
        let repo = UserRepository::new(state.get_db());
        assert!(!repo.find_by_id(&id).await.unwrap().unwrap().deactivated);
    }

    #[tokio::test]
    async fn test_deactivate_missing_user() {
        let state = test_state().await;
        let err = deactivate(State(state), Path("user:ghost".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
