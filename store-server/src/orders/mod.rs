//! Order Lifecycle
//!
//! - [`manager`] - the order state machine plus inventory coordination
//! - [`money`] - decimal price validation
//! - [`notify`] - best-effort receipt/email notification chain

pub mod manager;
pub mod money;
pub mod notify;

pub use manager::OrderManager;
pub use notify::{NotificationOutcome, Notifier};
