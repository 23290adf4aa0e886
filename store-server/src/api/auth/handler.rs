//! Authentication Handlers
//!
//! Registration (legacy email+password), login, federated sign-in, and
//! the current-user endpoint.

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use validator::ValidateEmail;

use shared::client::{FederatedLoginRequest, LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use shared::util::now_millis;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Role, User};
use crate::db::repository::UserRepository;
use crate::services::{IdentityProfile, ServiceError};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 30;

fn issue_token(state: &ServerState, user: &User) -> AppResult<LoginResponse> {
    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.username, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok(LoginResponse {
        token,
        user: UserInfo::from(user.clone()),
    })
}

fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if req.username.trim().is_empty() || req.username.len() > MAX_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "Username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !req.email.validate_email() {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// POST /api/auth/register - 注册 (email+password 凭证模式)
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    validate_registration(&req)?;

    let repo = UserRepository::new(state.get_db());

    // Uniqueness; a deactivated holder of the key is reported as such,
    // independent of anything else about the request
    if let Some(existing) = repo.find_by_username_ci(&req.username).await? {
        return Err(if existing.deactivated {
            AppError::new(ErrorCode::AccountDeactivated)
        } else {
            AppError::new(ErrorCode::UsernameTaken)
        });
    }
    if let Some(existing) = repo.find_by_email(&req.email).await? {
        return Err(if existing.deactivated {
            AppError::new(ErrorCode::AccountDeactivated)
        } else {
            AppError::new(ErrorCode::EmailTaken)
        });
    }

    let hash = User::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let user = repo
        .create(User {
            id: None,
            subject: None,
            name: req.name.trim().to_string(),
            username: req.username.trim().to_string(),
            username_lower: req.username.trim().to_lowercase(),
            email: Some(req.email.clone()),
            hash_pass: Some(hash),
            avatar: None,
            role: Role::User,
            deactivated: false,
            created_at: now_millis(),
        })
        .await?;

    tracing::info!(username = %user.username, "User registered");

    Ok(Json(ApiResponse::success(issue_token(&state, &user)?)))
}

/// POST /api/auth/login - 登录
///
/// `identifier` 接受用户名或邮箱。统一错误消息防止用户名枚举。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let repo = UserRepository::new(state.get_db());

    let mut user = repo.find_by_username_ci(&req.identifier).await?;
    if user.is_none() {
        user = repo.find_by_email(&req.identifier).await?;
    }

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(user) => user,
        None => {
            tracing::warn!(identifier = %req.identifier, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Deactivation wins over credential correctness
    if user.deactivated {
        tracing::warn!(username = %user.username, "Login rejected - account deactivated");
        return Err(AppError::new(ErrorCode::AccountDeactivated));
    }

    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        tracing::warn!(username = %user.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(ApiResponse::success(issue_token(&state, &user)?)))
}

/// POST /api/auth/federated - 联合登录
///
/// 将身份提供方的 bearer 凭证换成本地 JWT。首次登录自动开户。
pub async fn federated(
    State(state): State<ServerState>,
    Json(req): Json<FederatedLoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let profile = state.identity.verify(&req.token).await.map_err(|e| match e {
        ServiceError::Status(401) | ServiceError::Status(403) => {
            AppError::invalid_token("Identity provider rejected the credential")
        }
        other => AppError::integration(format!("Identity verification failed: {}", other)),
    })?;

    let repo = UserRepository::new(state.get_db());

    let user = match repo.find_by_subject(&profile.subject).await? {
        Some(user) => user,
        None => provision_federated_user(&repo, &profile).await?,
    };

    if user.deactivated {
        tracing::warn!(username = %user.username, "Federated login rejected - account deactivated");
        return Err(AppError::new(ErrorCode::AccountDeactivated));
    }

    tracing::info!(username = %user.username, subject = %profile.subject, "Federated login");

    Ok(Json(ApiResponse::success(issue_token(&state, &user)?)))
}

/// First federated sign-in: create the local account.
async fn provision_federated_user(
    repo: &UserRepository,
    profile: &IdentityProfile,
) -> AppResult<User> {
    // The provider-side email may only be adopted if no local account
    // already claims it
    let email = match &profile.email {
        Some(email) => {
            if repo.find_by_email(email).await?.is_some() {
                return Err(AppError::new(ErrorCode::EmailTaken));
            }
            Some(email.clone())
        }
        None => None,
    };

    let base = profile
        .preferred_username
        .clone()
        .or_else(|| {
            profile
                .email
                .as_ref()
                .and_then(|e| e.split('@').next().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| format!("user-{}", &profile.subject));
    let base: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_USERNAME_LEN - 4)
        .collect();
    let base = if base.is_empty() { "user".to_string() } else { base };

    // Find a free username: base, base-2, base-3, ...
    let mut username = base.clone();
    let mut counter = 2;
    while repo.find_by_username_ci(&username).await?.is_some() {
        username = format!("{}-{}", base, counter);
        counter += 1;
        if counter > 50 {
            return Err(AppError::internal("Could not derive a unique username"));
        }
    }

    let user = repo
        .create(User {
            id: None,
            subject: Some(profile.subject.clone()),
            name: profile.name.clone(),
            username: username.clone(),
            username_lower: username.to_lowercase(),
            email,
            hash_pass: None,
            avatar: None,
            role: Role::User,
            deactivated: false,
            created_at: now_millis(),
        })
        .await?;

    tracing::info!(username = %user.username, subject = %profile.subject, "Federated user provisioned");
    Ok(user)
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(ApiResponse::success(UserInfo::from(user))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    use crate::auth::{JwtConfig, JwtService};
    use crate::core::Config;
    use crate::db::DbService;
    use crate::services::{
        HttpBlobStore, HttpMailer, HttpReceiptRenderer, IdentityVerifier, ServiceResult,
    };

    /// Identity provider double that always verifies to the same profile
    struct FixedIdentity {
        profile: IdentityProfile,
    }

    #[async_trait]
    impl IdentityVerifier for FixedIdentity {
        async fn verify(&self, _bearer: &str) -> ServiceResult<IdentityProfile> {
            Ok(self.profile.clone())
        }

        async fn lookup_email(&self, _subject: &str) -> ServiceResult<Option<String>> {
            Ok(None)
        }
    }

    async fn test_state_with_identity(identity: Arc<dyn IdentityVerifier>) -> ServerState {
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
            identity,
            // Never reached by these tests
            blob_store: Arc::new(HttpBlobStore::new("http://localhost:1")),
            mailer: Arc::new(HttpMailer::new("http://localhost:1", "noreply@test")),
            renderer: Arc::new(HttpReceiptRenderer::new("http://localhost:1")),
        }
    }

    async fn test_state() -> ServerState {
        test_state_with_identity(Arc::new(FixedIdentity {
            profile: IdentityProfile {
                subject: "idp|unused".to_string(),
                name: "Unused".to_string(),
                email: None,
                preferred_username: None,
            },
        }))
        .await
    }

    fn registration(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Alice Example".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: "correct horse battery".to_string(),
        }
    }

    fn login_req(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login_by_username_and_email() {
        let state = test_state().await;

        register(State(state.clone()), Json(registration("alice", "alice@example.com")))
            .await
            .unwrap();

        let by_username = login(
            State(state.clone()),
            Json(login_req("alice", "correct horse battery")),
        )
        .await
        .unwrap();
        assert!(by_username.0.success);
        assert!(!by_username.0.data.unwrap().token.is_empty());

        let by_email = login(
            State(state),
            Json(login_req("alice@example.com", "correct horse battery")),
        )
        .await
        .unwrap();
        assert!(by_email.0.success);
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let state = test_state().await;
        register(State(state.clone()), Json(registration("alice", "alice@example.com")))
            .await
            .unwrap();

        let err = login(State(state), Json(login_req("alice", "wrong")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_case_insensitive() {
        let state = test_state().await;
        register(State(state.clone()), Json(registration("alice", "alice@example.com")))
            .await
            .unwrap();

        let err = register(
            State(state),
            Json(registration("ALICE", "other@example.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UsernameTaken);
    }

    #[tokio::test]
    async fn test_register_weak_inputs_rejected() {
        let state = test_state().await;

        let mut req = registration("alice", "not-an-email");
        let err = register(State(state.clone()), Json(req.clone())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        req.email = "alice@example.com".to_string();
        req.password = "short".to_string();
        let err = register(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_deactivated_login_rejected_regardless_of_password() {
        let state = test_state().await;
        register(State(state.clone()), Json(registration("alice", "alice@example.com")))
            .await
            .unwrap();

        let repo = UserRepository::new(state.get_db());
        let user = repo.find_by_username_ci("alice").await.unwrap().unwrap();
        let id = user.id.as_ref().unwrap().to_string();
        repo.set_deactivated(&id, true).await.unwrap();

        // Correct password: still rejected as deactivated
        let err = login(
            State(state.clone()),
            Json(login_req("alice", "correct horse battery")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDeactivated);

        // Wrong password: same rejection, credential correctness irrelevant
        let err = login(State(state.clone()), Json(login_req("alice", "wrong")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDeactivated);

        // Registration keyed by the deactivated email is rejected the same way
        let err = register(
            State(state),
            Json(registration("fresh-name", "alice@example.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDeactivated);
    }

    #[tokio::test]
    async fn test_federated_provisions_once_then_reuses() {
        let state = test_state_with_identity(Arc::new(FixedIdentity {
            profile: IdentityProfile {
                subject: "idp|alice".to_string(),
                name: "Alice Example".to_string(),
                email: Some("alice@idp.example".to_string()),
                preferred_username: Some("alice".to_string()),
            },
        }))
        .await;

        let req = FederatedLoginRequest {
            token: "opaque-bearer".to_string(),
        };

        let first = federated(State(state.clone()), Json(req.clone())).await.unwrap();
        let user = first.0.data.unwrap().user;
        assert_eq!(user.username, "alice");

        // Second sign-in resolves the same account instead of provisioning
        let second = federated(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(second.0.data.unwrap().user.id, user.id);

        let repo = UserRepository::new(state.get_db());
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_federated_username_collision_gets_suffix() {
        let state = test_state_with_identity(Arc::new(FixedIdentity {
            profile: IdentityProfile {
                subject: "idp|other-alice".to_string(),
                name: "Other Alice".to_string(),
                email: None,
                preferred_username: Some("alice".to_string()),
            },
        }))
        .await;

        // A legacy user already owns "alice"
        register(State(state.clone()), Json(registration("alice", "alice@example.com")))
            .await
            .unwrap();

        let result = federated(
            State(state),
            Json(FederatedLoginRequest {
                token: "opaque-bearer".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.0.data.unwrap().user.username, "alice-2");
    }

    #[tokio::test]
    async fn test_federated_deactivated_rejected() {
        let state = test_state_with_identity(Arc::new(FixedIdentity {
            profile: IdentityProfile {
                subject: "idp|alice".to_string(),
                name: "Alice Example".to_string(),
                email: None,
                preferred_username: Some("alice".to_string()),
            },
        }))
        .await;

        let req = FederatedLoginRequest {
            token: "opaque-bearer".to_string(),
        };
        federated(State(state.clone()), Json(req.clone())).await.unwrap();

        let repo = UserRepository::new(state.get_db());
        let user = repo.find_by_subject("idp|alice").await.unwrap().unwrap();
        repo.set_deactivated(&user.id.as_ref().unwrap().to_string(), true)
            .await
            .unwrap();

        let err = federated(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDeactivated);
    }
}
