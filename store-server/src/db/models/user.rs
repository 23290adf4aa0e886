//! User Model

use super::ImageRef;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse a role name; anything unknown falls back to the ordinary role
    pub fn parse(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// User account
///
/// 凭证模式二选一：联合身份 (subject) 或 email+password，创建时必须恰好一种。
/// API 响应一律通过 [`UserInfo`] 投影，哈希不出网。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<UserId>,
    /// Identity-provider subject (federated credential mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub name: String,
    pub username: String,
    /// Lowercased copy backing the case-insensitive unique index
    pub username_lower: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Argon2 hash (legacy credential mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<ImageRef>,
    pub role: Role,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub deactivated: bool,
    pub created_at: i64,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let Some(hash) = &self.hash_pass else {
            return Ok(false);
        };
        let parsed_hash = PasswordHash::new(hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role.as_str().to_string(),
            avatar_url: user.avatar.map(|a| a.url),
            deactivated: user.deactivated,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hash = User::hash_password("hunter2!").expect("hashing failed");
        let user = User {
            id: None,
            subject: None,
            name: "Test".to_string(),
            username: "test".to_string(),
            username_lower: "test".to_string(),
            email: Some("test@example.com".to_string()),
            hash_pass: Some(hash),
            avatar: None,
            role: Role::User,
            deactivated: false,
            created_at: 0,
        };

        assert!(user.verify_password("hunter2!").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }

    #[test]
    fn test_verify_without_hash_fails() {
        let user = User {
            id: None,
            subject: Some("idp|123".to_string()),
            name: "Fed".to_string(),
            username: "fed".to_string(),
            username_lower: "fed".to_string(),
            email: None,
            hash_pass: None,
            avatar: None,
            role: Role::User,
            deactivated: false,
            created_at: 0,
        };

        // Federated-only accounts can never pass a password check
        assert!(!user.verify_password("anything").unwrap());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("garbage"), Role::User);
    }
}
