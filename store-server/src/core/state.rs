use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::{Notifier, OrderManager};
use crate::reporting::SalesReporting;
use crate::reviews::ReviewAggregator;
use crate::services::{
    BlobStore, HttpBlobStore, HttpIdentityVerifier, HttpMailer, HttpReceiptRenderer,
    IdentityVerifier, Mailer, ReceiptRenderer,
};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求处理器克隆一份。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt_service | JWT 认证服务 |
/// | identity | 身份验证服务 (第三方) |
/// | blob_store | 图片存储服务 (第三方) |
/// | mailer | 邮件服务 (第三方) |
/// | renderer | 收据渲染服务 (第三方) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 身份验证服务
    pub identity: Arc<dyn IdentityVerifier>,
    /// 图片存储服务
    pub blob_store: Arc<dyn BlobStore>,
    /// 邮件服务
    pub mailer: Arc<dyn Mailer>,
    /// 收据渲染服务
    pub renderer: Arc<dyn ReceiptRenderer>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 打开数据库 (work_dir/database/store.db)
    /// 3. 构建第三方服务客户端
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).expect("Failed to create database directory");

        let db_path = db_dir.join("store.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self {
            config: config.clone(),
            db: db_service.db,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            identity: Arc::new(HttpIdentityVerifier::new(&config.identity_provider_url)),
            blob_store: Arc::new(HttpBlobStore::new(&config.blob_store_url)),
            mailer: Arc::new(HttpMailer::new(&config.mail_api_url, &config.mail_from)),
            renderer: Arc::new(HttpReceiptRenderer::new(&config.receipt_renderer_url)),
        }
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 构建订单生命周期管理器
    pub fn order_manager(&self) -> OrderManager {
        let notifier = Notifier::new(
            self.identity.clone(),
            self.renderer.clone(),
            self.mailer.clone(),
        );
        OrderManager::new(self.db.clone(), notifier)
    }

    /// 构建评论聚合器
    pub fn review_aggregator(&self) -> ReviewAggregator {
        ReviewAggregator::new(self.db.clone())
    }

    /// 构建销售报表服务
    pub fn reporting(&self) -> SalesReporting {
        SalesReporting::new(self.db.clone())
    }
}
