// ==========================================
// 供货合同系统 - 领域模型层
// ==========================================
// 职责: 定义实体、复合主键、查询结果行
// 红线: 不含数据访问逻辑
// ==========================================

pub mod contract;
pub mod delivery;
pub mod report;
pub mod types;
pub mod warehouse;

// 重导出核心类型
pub use contract::{Contract, ContractKey};
pub use delivery::{Delivery, DeliveryKey};
pub use report::{ContractPriority, ContractSummary, DeliveryView, PriceThresholdDelivery};
pub use types::{format_date, parse_calendar_date, ValidityInterval, DATE_FORMAT};
pub use warehouse::Warehouse;
