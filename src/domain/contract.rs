// ==========================================
// 供货合同系统 - 合同领域模型
// ==========================================
// 对齐: contracts 表，主键 (contract_no, part_code)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::types::ValidityInterval;

// ==========================================
// Contract - 供货合同（按零件拆行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    // ===== 主键 =====
    pub contract_no: i64,
    pub part_code: String,

    pub unit: String, // 计量单位

    // ===== 有效期 (闭区间) =====
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub plan_qty: f64,       // 计划数量
    pub contract_price: f64, // 合同单价
}

impl Contract {
    pub fn key(&self) -> ContractKey {
        ContractKey::new(self.contract_no, self.part_code.clone())
    }

    /// 合同有效期；库中数据违反 start <= end 时返回 None
    pub fn interval(&self) -> Option<ValidityInterval> {
        ValidityInterval::new(self.start_date, self.end_date)
    }
}

/// 合同复合主键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractKey {
    pub contract_no: i64,
    pub part_code: String,
}

impl ContractKey {
    pub fn new(contract_no: i64, part_code: impl Into<String>) -> Self {
        Self {
            contract_no,
            part_code: part_code.into(),
        }
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract_no={}, part_code={}", self.contract_no, self.part_code)
    }
}
