//! Order notification chain
//!
//! Resolve a recipient address, render the receipt, send the email with
//! the receipt attached. The whole chain is best-effort: the outcome is
//! logged and reported next to the primary result, never inside its error
//! channel. A notification failure must not fail the order operation.

use std::sync::Arc;

use crate::db::models::{Order, User};
use crate::services::{
    EmailAttachment, IdentityVerifier, Mailer, OutboundEmail, ReceiptRenderer, ServiceError,
};

/// Outcome of one notification attempt (two-phase contract: observable,
/// but separate from the primary operation's result)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Email handed to the mail service
    Sent,
    /// No recipient address could be resolved
    Skipped(String),
    /// Some step of the resolve/render/send chain failed
    Failed(String),
}

impl NotificationOutcome {
    /// Log the outcome against the order id
    pub fn log(&self, order_id: &str) {
        match self {
            NotificationOutcome::Sent => {
                tracing::info!(order = %order_id, "Order notification sent");
            }
            NotificationOutcome::Skipped(reason) => {
                tracing::info!(order = %order_id, reason = %reason, "Order notification skipped");
            }
            NotificationOutcome::Failed(reason) => {
                tracing::warn!(order = %order_id, reason = %reason, "Order notification failed");
            }
        }
    }
}

/// Best-effort notification dispatcher
#[derive(Clone)]
pub struct Notifier {
    identity: Arc<dyn IdentityVerifier>,
    renderer: Arc<dyn ReceiptRenderer>,
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(
        identity: Arc<dyn IdentityVerifier>,
        renderer: Arc<dyn ReceiptRenderer>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            identity,
            renderer,
            mailer,
        }
    }

    /// Notify the ordering user about the order's current status.
    ///
    /// Never returns an error - every failure collapses into the outcome.
    pub async fn order_status(&self, order: &Order, user: &User) -> NotificationOutcome {
        let order_id = order.id.as_ref().map(|t| t.to_string()).unwrap_or_default();

        // 1. Resolve recipient: local email first, provider record second
        let address = match self.resolve_address(user).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                let outcome =
                    NotificationOutcome::Skipped("no email address on record".to_string());
                outcome.log(&order_id);
                return outcome;
            }
            Err(e) => {
                let outcome = NotificationOutcome::Failed(format!("address lookup: {e}"));
                outcome.log(&order_id);
                return outcome;
            }
        };

        // 2. Render the receipt
        let receipt = match self.renderer.render(order).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let outcome = NotificationOutcome::Failed(format!("receipt render: {e}"));
                outcome.log(&order_id);
                return outcome;
            }
        };

        // 3. Send
        let email = OutboundEmail {
            to: address,
            subject: format!("Your order {} is {}", order_id, order.status.label()),
            html_body: status_email_body(order, &user.name),
            attachments: vec![EmailAttachment {
                filename: "receipt.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: receipt,
            }],
        };

        let outcome = match self.mailer.send(email).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(e) => NotificationOutcome::Failed(format!("mail send: {e}")),
        };
        outcome.log(&order_id);
        outcome
    }

    async fn resolve_address(&self, user: &User) -> Result<Option<String>, ServiceError> {
        if let Some(email) = &user.email {
            return Ok(Some(email.clone()));
        }
        match &user.subject {
            Some(subject) => self.identity.lookup_email(subject).await,
            None => Ok(None),
        }
    }
}

fn status_email_body(order: &Order, name: &str) -> String {
    let order_id = order.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    format!(
        "<p>Hi {name},</p>\
         <p>Your order <strong>{order_id}</strong> is now <strong>{}</strong>.</p>\
         <p>Order total: {:.2}. The receipt is attached.</p>",
        order.status.label(),
        order.total_price,
    )
}
