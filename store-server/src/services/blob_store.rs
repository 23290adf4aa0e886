//! Blob storage service client
//!
//! Image hosting: upload a payload, get back a public URL plus an opaque
//! identifier used for later deletion.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::{ServiceError, ServiceResult};
use crate::db::models::ImageRef;

/// Handle returned by the store for an uploaded blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBlob {
    pub external_id: String,
    pub url: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a payload, returning the public URL and deletion id
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> ServiceResult<StoredBlob>;

    /// Delete a previously uploaded blob by its opaque id
    async fn delete(&self, external_id: &str) -> ServiceResult<()>;
}

/// HTTP implementation against the blob store's REST API
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct UploadBody<'a> {
    filename: &'a str,
    content_type: &'a str,
    data: String,
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> ServiceResult<StoredBlob> {
        let body = UploadBody {
            filename,
            content_type,
            data: BASE64.encode(&data),
        };

        let response = self
            .client
            .post(format!("{}/blobs", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        response
            .json::<StoredBlob>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn delete(&self, external_id: &str) -> ServiceResult<()> {
        let response = self
            .client
            .delete(format!("{}/blobs/{}", self.base_url, external_id))
            .send()
            .await?;

        // 404 means already gone - fine for cleanup purposes
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(ServiceError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Release image blobs best-effort: failures are logged, never propagated.
/// 与实体删除不在同一事务内
pub async fn release_images(store: &dyn BlobStore, images: &[ImageRef]) {
    for image in images {
        if let Err(e) = store.delete(&image.external_id).await {
            tracing::warn!(
                external_id = %image.external_id,
                error = %e,
                "Failed to release image blob"
            );
        }
    }
}
