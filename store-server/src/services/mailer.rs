//! Transactional email service client

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use super::{ServiceError, ServiceResult};

/// Binary attachment for an outbound email
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Outbound transactional email
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> ServiceResult<()>;
}

/// HTTP implementation against the mail provider's REST API
pub struct HttpMailer {
    client: reqwest::Client,
    base_url: String,
    from: String,
}

impl HttpMailer {
    pub fn new(base_url: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            from: from.into(),
        }
    }
}

#[derive(Serialize)]
struct AttachmentBody<'a> {
    filename: &'a str,
    content_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct SendBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    attachments: Vec<AttachmentBody<'a>>,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutboundEmail) -> ServiceResult<()> {
        let body = SendBody {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html_body,
            attachments: email
                .attachments
                .iter()
                .map(|a| AttachmentBody {
                    filename: &a.filename,
                    content_type: &a.content_type,
                    data: BASE64.encode(&a.data),
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/send", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
