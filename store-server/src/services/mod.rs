//! External service collaborators
//!
//! Each third-party dependency is a narrow trait with an HTTP-backed
//! implementation:
//!
//! - [`identity`] - identity verification service (federated login)
//! - [`blob_store`] - image hosting
//! - [`mailer`] - transactional email
//! - [`receipt`] - order receipt rendering (PDF)

pub mod blob_store;
pub mod identity;
pub mod mailer;
pub mod receipt;

pub use blob_store::{BlobStore, HttpBlobStore, StoredBlob, release_images};
pub use identity::{HttpIdentityVerifier, IdentityProfile, IdentityVerifier};
pub use mailer::{EmailAttachment, HttpMailer, Mailer, OutboundEmail};
pub use receipt::{HttpReceiptRenderer, ReceiptRenderer};

use thiserror::Error;

/// Errors from third-party service calls
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Service returned status {0}")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Request(err.to_string())
    }
}

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;
