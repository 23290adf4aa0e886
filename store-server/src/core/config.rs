use std::path::PathBuf;

use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/store | 工作目录（数据库、日志） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | IDENTITY_PROVIDER_URL | http://localhost:4100 | 身份验证服务地址 |
/// | BLOB_STORE_URL | http://localhost:4200 | 图片存储服务地址 |
/// | MAIL_API_URL | http://localhost:4300 | 邮件服务地址 |
/// | MAIL_FROM | orders@store.example | 发件人地址 |
/// | RECEIPT_RENDERER_URL | http://localhost:4400 | 收据渲染服务地址 |
/// | CATALOG_PAGE_SIZE | 8 | 商品列表固定页大小 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/store HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 第三方服务 ===
    /// 身份验证服务 URL (联合登录)
    pub identity_provider_url: String,
    /// 图片存储服务 URL
    pub blob_store_url: String,
    /// 邮件服务 URL
    pub mail_api_url: String,
    /// 邮件发件人
    pub mail_from: String,
    /// 收据渲染服务 URL
    pub receipt_renderer_url: String,

    // === 目录行为 ===
    /// 商品列表固定页大小
    pub catalog_page_size: u32,
}

impl Config {
    /// 从环境变量加载配置，未设置时使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            identity_provider_url: std::env::var("IDENTITY_PROVIDER_URL")
                .unwrap_or_else(|_| "http://localhost:4100".into()),
            blob_store_url: std::env::var("BLOB_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:4200".into()),
            mail_api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "http://localhost:4300".into()),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "orders@store.example".into()),
            receipt_renderer_url: std::env::var("RECEIPT_RENDERER_URL")
                .unwrap_or_else(|_| "http://localhost:4400".into()),

            catalog_page_size: std::env::var("CATALOG_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8),
        }
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
