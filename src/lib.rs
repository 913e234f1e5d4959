// ==========================================
// 供货合同系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + tokio
// 系统定位: 仓库/合同/到货记录维护与分析查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 运行参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 性能统计（SQL 计数 + 慢查询日志）
pub mod perf;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - API 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Contract, ContractKey, ContractPriority, ContractSummary, Delivery, DeliveryKey,
    DeliveryView, PriceThresholdDelivery, ValidityInterval, Warehouse,
};

// API
pub use api::{
    AnalyticsApi, ApiError, ApiResult, ContractApi, ContractInput, DeliveryApi, DeliveryInput,
    OverviewApi, ProcedureApi, SupplyOverview, WarehouseApi,
};

// 应用与配置
pub use app::AppState;
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供货合同系统";
