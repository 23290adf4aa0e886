//! Identity verification service client
//!
//! Verifies a bearer credential with the external identity provider and
//! returns a stable subject identifier plus profile data. Also used to
//! look up the provider-side email address of a federated user when no
//! local email is stored.

use async_trait::async_trait;
use serde::Deserialize;

use super::{ServiceError, ServiceResult};

/// Profile returned by the identity provider for a verified credential
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProfile {
    /// Stable subject identifier
    pub subject: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer credential, returning the subject's profile
    async fn verify(&self, bearer: &str) -> ServiceResult<IdentityProfile>;

    /// Look up the provider-side email for a known subject
    async fn lookup_email(&self, subject: &str) -> ServiceResult<Option<String>>;
}

/// HTTP implementation against the identity provider's REST API
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityVerifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubjectRecord {
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, bearer: &str) -> ServiceResult<IdentityProfile> {
        let response = self
            .client
            .get(format!("{}/userinfo", self.base_url))
            .bearer_auth(bearer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        response
            .json::<IdentityProfile>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn lookup_email(&self, subject: &str) -> ServiceResult<Option<String>> {
        let response = self
            .client
            .get(format!("{}/subjects/{}", self.base_url, subject))
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        let record = response
            .json::<SubjectRecord>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        Ok(record.email)
    }
}
