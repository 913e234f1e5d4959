// ==========================================
// 供货合同系统 - API 层
// ==========================================
// 职责: 提供调用方可见的业务接口（列表/写入/分析查询/合同汇总）
// 约束: 入参日期为 YYYY-MM-DD 文本，错误统一为 ApiError
// ==========================================

pub mod analytics_api;
pub mod contract_api;
pub mod delivery_api;
pub mod error;
pub mod overview_api;
pub mod params;
pub mod procedure_api;
pub mod validator;
pub mod warehouse_api;

// 重导出核心类型
pub use analytics_api::AnalyticsApi;
pub use contract_api::{ContractApi, ContractInput};
pub use delivery_api::DeliveryApi;
pub use error::{ApiError, ApiResult};
pub use overview_api::{OverviewApi, SupplyOverview};
pub use params::{BulkWarehouseParams, PriceThresholdParams};
pub use procedure_api::ProcedureApi;
pub use validator::{DeliveryInput, DeliveryWriteValidator};
pub use warehouse_api::WarehouseApi;
