//! Store Server - 笔记本电脑零售商店后端
//!
//! # 架构概述
//!
//! 分层 CRUD 应用：HTTP 处理器校验输入，委托给文档型持久层
//! (嵌入式 SurrealDB)，并通过窄接口调用第三方服务。
//!
//! - **目录** (`api/products`): 商品 CRUD、搜索、分页
//! - **订单** (`orders`): 订单状态机 + 库存协调 + 尽力通知
//! - **库存** (`inventory`): 带符号库存增减
//! - **评论** (`reviews`): 评分聚合不变量维护
//! - **报表** (`reporting`): 只读销售聚合
//! - **认证** (`auth`): JWT + Argon2 + 联合身份
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、中间件
//! ├── db/            # 数据库层（模型、仓库）
//! ├── inventory.rs   # 库存增减
//! ├── orders/        # 订单生命周期
//! ├── reviews/       # 评论聚合
//! ├── reporting/     # 销售报表
//! ├── services/      # 第三方服务客户端
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod reporting;
pub mod reviews;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use inventory::{InventoryAdjuster, StockDirection};
pub use orders::{NotificationOutcome, OrderManager};
pub use reviews::ReviewAggregator;

// Re-export unified error types from shared
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
