// ==========================================
// 供货合同系统 - 到货领域模型
// ==========================================
// 对齐: deliveries 表，主键 (warehouse_no, receipt_doc_no)
// 不变量: received_date 落在所引用合同的有效期内（写入时由校验器保证）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::contract::ContractKey;

// ==========================================
// Delivery - 到货记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    // ===== 主键 =====
    pub warehouse_no: i64,
    pub receipt_doc_no: i64, // 入库单号

    // ===== 合同引用 =====
    pub contract_no: i64,
    pub part_code: String,

    pub unit: String,
    pub qty: f64,
    pub received_date: NaiveDate,
}

impl Delivery {
    pub fn key(&self) -> DeliveryKey {
        DeliveryKey {
            warehouse_no: self.warehouse_no,
            receipt_doc_no: self.receipt_doc_no,
        }
    }

    pub fn contract_key(&self) -> ContractKey {
        ContractKey::new(self.contract_no, self.part_code.clone())
    }
}

/// 到货复合主键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryKey {
    pub warehouse_no: i64,
    pub receipt_doc_no: i64,
}

impl fmt::Display for DeliveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "warehouse_no={}, receipt_doc_no={}",
            self.warehouse_no, self.receipt_doc_no
        )
    }
}
