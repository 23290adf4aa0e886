//! Unified error codes for the storefront backend
//!
//! Error codes are shared between the server and API clients. They are
//! organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Review errors
//! - 6xxx: Product errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ErrorCategory;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient
/// serialization and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account has been deactivated
    AccountDeactivated = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Admin accounts cannot be deactivated
    CannotDeactivateAdmin = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been delivered (terminal state)
    OrderAlreadyDelivered = 4002,
    /// Order has already been cancelled (terminal state)
    OrderAlreadyCancelled = 4003,
    /// Supplied order totals do not add up
    PriceMismatch = 4004,
    /// Order contains no line items
    EmptyOrder = 4005,

    // ==================== 5xxx: Review ====================
    /// Reviewer has no delivered order containing the product
    ReviewNotEligible = 5001,
    /// Review not found
    ReviewNotFound = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already taken (case-insensitive)
    UsernameTaken = 8002,
    /// Email already registered
    EmailTaken = 8003,
    /// Exactly one credential mode must be supplied at creation
    CredentialModeInvalid = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Third-party integration error
    IntegrationError = 9003,
}

impl ErrorCode {
    /// Numeric value of the code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for the code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::AccountDeactivated => "Account has been deactivated",

            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::CannotDeactivateAdmin => "Admin accounts cannot be deactivated",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyDelivered => "Order has already been delivered",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::PriceMismatch => "Order totals do not add up",
            ErrorCode::EmptyOrder => "Order contains no items",

            ErrorCode::ReviewNotEligible => "No delivered order containing this product",
            ErrorCode::ReviewNotFound => "Review not found",

            ErrorCode::ProductNotFound => "Product not found",

            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameTaken => "Username is already taken",
            ErrorCode::EmailTaken => "Email is already registered",
            ErrorCode::CredentialModeInvalid => {
                "Exactly one of federated subject or email+password is required"
            }

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::IntegrationError => "Third-party service error",
        }
    }

    /// HTTP status code for the error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::PriceMismatch
            | ErrorCode::EmptyOrder
            | ErrorCode::CredentialModeInvalid => StatusCode::BAD_REQUEST,

            ErrorCode::NotAuthenticated
            | ErrorCode::InvalidCredentials
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid => StatusCode::UNAUTHORIZED,

            ErrorCode::PermissionDenied
            | ErrorCode::AdminRequired
            | ErrorCode::CannotDeactivateAdmin
            | ErrorCode::AccountDeactivated
            | ErrorCode::ReviewNotEligible => StatusCode::FORBIDDEN,

            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::ReviewNotFound
            | ErrorCode::ProductNotFound
            | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,

            ErrorCode::AlreadyExists
            | ErrorCode::OrderAlreadyDelivered
            | ErrorCode::OrderAlreadyCancelled
            | ErrorCode::UsernameTaken
            | ErrorCode::EmailTaken => StatusCode::CONFLICT,

            ErrorCode::Unknown
            | ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::IntegrationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Category band of the code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::of(self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1007 => ErrorCode::AccountDeactivated,
            2001 => ErrorCode::PermissionDenied,
            2003 => ErrorCode::AdminRequired,
            2004 => ErrorCode::CannotDeactivateAdmin,
            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderAlreadyDelivered,
            4003 => ErrorCode::OrderAlreadyCancelled,
            4004 => ErrorCode::PriceMismatch,
            4005 => ErrorCode::EmptyOrder,
            5001 => ErrorCode::ReviewNotEligible,
            5002 => ErrorCode::ReviewNotFound,
            6001 => ErrorCode::ProductNotFound,
            8001 => ErrorCode::UserNotFound,
            8002 => ErrorCode::UsernameTaken,
            8003 => ErrorCode::EmailTaken,
            8004 => ErrorCode::CredentialModeInvalid,
            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9003 => ErrorCode::IntegrationError,
            other => return Err(format!("unknown error code: {}", other)),
        };
        Ok(code)
    }
}
