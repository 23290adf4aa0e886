//! User Repository

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::User;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a user after checking the creation invariants.
    ///
    /// Exactly one credential mode must be present: a federated subject,
    /// or an email plus password hash. Username uniqueness is
    /// case-insensitive (backed by the unique index on `username_lower`);
    /// email uniqueness applies only when an email is present.
    pub async fn create(&self, user: User) -> RepoResult<User> {
        match (user.subject.is_some(), user.hash_pass.is_some()) {
            // Federated account; a provider-side email may tag along
            (true, false) => {}
            (false, true) if user.email.is_some() => {}
            (false, true) => {
                return Err(RepoError::Validation(
                    "Password accounts require an email".to_string(),
                ));
            }
            _ => {
                return Err(RepoError::Validation(
                    "Exactly one credential mode (federated subject or email+password) is required"
                        .to_string(),
                ));
            }
        }

        if self
            .find_by_username_ci(&user.username)
            .await?
            .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        if let Some(email) = &user.email
            && self.find_by_email(email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = make_record_id(USER_TABLE, id);
        let user: Option<User> = self.base.db().select(rid).await?;
        Ok(user)
    }

    /// Find user by username, case-insensitive
    pub async fn find_by_username_ci(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username_lower = $u LIMIT 1")
            .bind(("u", username.to_lowercase()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by identity-provider subject
    pub async fn find_by_subject(&self, subject: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE subject = $subject LIMIT 1")
            .bind(("subject", subject.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// All users (admin listing)
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at ASC")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Flip the deactivated flag
    pub async fn set_deactivated(&self, id: &str, deactivated: bool) -> RepoResult<User> {
        let rid = make_record_id(USER_TABLE, id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET deactivated = $deactivated RETURN AFTER")
            .bind(("id", rid))
            .bind(("deactivated", deactivated))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete; returns the deleted document so the caller can release
    /// the avatar blob
    pub async fn delete(&self, id: &str) -> RepoResult<User> {
        let rid = make_record_id(USER_TABLE, id);
        let deleted: Option<User> = self.base.db().delete(rid).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }
}
