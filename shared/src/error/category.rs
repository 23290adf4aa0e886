//! Error categories
//!
//! Coarse classification derived from the numeric band of an error code.

use serde::{Deserialize, Serialize};

/// Error category, derived from the code's thousands band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx - general errors
    General,
    /// 1xxx - authentication
    Auth,
    /// 2xxx - permission
    Permission,
    /// 4xxx - order domain
    Order,
    /// 5xxx - review domain
    Review,
    /// 6xxx - product domain
    Product,
    /// 8xxx - user domain
    User,
    /// 9xxx - system errors (logged server-side)
    System,
}

impl ErrorCategory {
    /// Classify a raw code value
    pub fn of(code: u16) -> Self {
        match code / 1000 {
            0 => ErrorCategory::General,
            1 => ErrorCategory::Auth,
            2 => ErrorCategory::Permission,
            4 => ErrorCategory::Order,
            5 => ErrorCategory::Review,
            6 => ErrorCategory::Product,
            8 => ErrorCategory::User,
            _ => ErrorCategory::System,
        }
    }

    /// System errors get logged with full detail on the server
    pub fn is_system(&self) -> bool {
        matches!(self, ErrorCategory::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_classification() {
        assert_eq!(ErrorCategory::of(2), ErrorCategory::General);
        assert_eq!(ErrorCategory::of(1002), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::of(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::of(4004), ErrorCategory::Order);
        assert_eq!(ErrorCategory::of(5001), ErrorCategory::Review);
        assert_eq!(ErrorCategory::of(6001), ErrorCategory::Product);
        assert_eq!(ErrorCategory::of(8002), ErrorCategory::User);
        assert_eq!(ErrorCategory::of(9002), ErrorCategory::System);
        assert!(ErrorCategory::of(9001).is_system());
    }
}
