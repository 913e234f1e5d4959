// ==========================================
// 供货合同系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
//       （唯一例外是过程调用语句，见 procedure_repo::quote_literal）
// ==========================================

pub mod analytics_repo;
pub mod contract_repo;
pub mod delivery_repo;
pub mod error;
pub mod gateway;
pub mod procedure_repo;
pub mod warehouse_repo;

// 重导出核心仓储
pub use analytics_repo::{AnalyticsRepository, PRIORITY_PRICE_FLOOR};
pub use contract_repo::ContractRepository;
pub use delivery_repo::DeliveryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use gateway::{CancelToken, GatewaySettings, StorageGateway};
pub use procedure_repo::{
    call_statement, quote_literal, ContractSummaryProcedure, ContractSummarySource,
};
pub use warehouse_repo::WarehouseRepository;
