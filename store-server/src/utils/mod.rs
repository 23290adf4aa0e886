//! 工具模块
//!
//! - [`AppError`] / [`ApiResponse`] - 统一错误与响应 (re-export from shared)
//! - [`logger`] - 日志初始化

pub mod logger;

// Re-export error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
