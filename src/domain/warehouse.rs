// ==========================================
// 供货合同系统 - 仓库领域模型
// ==========================================
// 对齐: warehouses 表
// ==========================================

use serde::{Deserialize, Serialize};

/// 仓库
///
/// warehouse_no 由数据库在创建时分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub warehouse_no: i64,
    pub manager_surname: String, // 负责人姓氏
}
