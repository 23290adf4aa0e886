//! Image Reference Model
//!
//! A handle to an image held by the external blob store: the public URL
//! plus the opaque identifier needed to delete it later.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Opaque identifier assigned by the blob store (used for deletion)
    pub external_id: String,
    /// Public URL
    pub url: String,
}
