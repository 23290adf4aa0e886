//! Receipt rendering service client
//!
//! Hands an order record to the document rendering utility and gets back
//! a binary PDF.

use async_trait::async_trait;

use super::{ServiceError, ServiceResult};
use crate::db::models::Order;

#[async_trait]
pub trait ReceiptRenderer: Send + Sync {
    /// Render the order receipt as a PDF
    async fn render(&self, order: &Order) -> ServiceResult<Vec<u8>>;
}

/// HTTP implementation against the rendering utility
pub struct HttpReceiptRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReceiptRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ReceiptRenderer for HttpReceiptRenderer {
    async fn render(&self, order: &Order) -> ServiceResult<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/render", self.base_url))
            .json(order)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
