//! Client-facing DTOs for the auth API
//!
//! Shared between the server handlers and API clients so both sides agree
//! on the wire shape.

use serde::{Deserialize, Serialize};

/// Registration payload (legacy email + password credential mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login payload
///
/// `identifier` accepts either the username or the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Federated login payload: an identity-provider bearer credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedLoginRequest {
    pub token: String,
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub deactivated: bool,
    pub created_at: i64,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}
