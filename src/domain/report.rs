// ==========================================
// 供货合同系统 - 只读投影与分析结果行
// ==========================================
// 说明: 这些结构只由查询产生，不落库
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DeliveryView - 全量到货视图行
// ==========================================
// 对齐: full_deliveries_view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryView {
    // ===== 仓库 =====
    pub warehouse_no: i64,
    pub manager_surname: String,

    // ===== 到货 =====
    pub receipt_doc_no: i64,
    pub received_date: NaiveDate,
    pub qty: f64,
    pub delivery_unit: String,

    pub contract_no: i64,
    pub part_code: String,

    // ===== 合同 =====
    pub contract_unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub plan_qty: f64,
    pub contract_price: f64,
}

/// 单价超过阈值的到货（按到货日期升序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceThresholdDelivery {
    pub warehouse_no: i64,
    pub part_code: String,
    pub receipt_doc_no: i64,
    pub received_date: NaiveDate,
    pub qty: f64,
    pub contract_no: i64,
    pub contract_price: f64,
}

/// 合同优先级排名行
///
/// - `total_plan_qty`: 同一 contract_no 下所有入选行的 plan_qty 之和
/// - `priority`: end_date 的密集排名，从 1 开始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractPriority {
    pub contract_no: i64,
    pub part_code: String,
    pub plan_qty: f64,
    pub end_date: NaiveDate,
    pub total_plan_qty: f64,
    pub priority: i64,
}

/// 合同执行汇总（p_contract_summary 的输出）
///
/// 合同不存在时 total_delivered = 0，contract_price = None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub contract_no: i64,
    pub part_code: String,
    pub total_delivered: f64,
    pub contract_price: Option<f64>,
}
