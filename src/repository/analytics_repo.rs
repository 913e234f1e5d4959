// ==========================================
// 供货合同系统 - 分析查询仓储
// ==========================================
// 职责: 三个只读分析查询
// - 单价阈值到货 (join + 过滤 + 排序)
// - 合同优先级 (窗口分区求和 + 密集排名)
// - 存在“整仓达标”的合同 (按仓分组取最小值 + EXISTS)
// 约束: 阈值全部参数化绑定；空结果是合法结果
// ==========================================

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::contract::Contract;
use crate::domain::report::{ContractPriority, PriceThresholdDelivery};
use crate::repository::contract_repo::map_contract;
use crate::repository::error::RepositoryResult;
use crate::repository::gateway::StorageGateway;

/// 合同优先级查询的固定单价门槛
pub const PRIORITY_PRICE_FLOOR: f64 = 100.0;

fn map_price_threshold_delivery(row: &Row<'_>) -> rusqlite::Result<PriceThresholdDelivery> {
    Ok(PriceThresholdDelivery {
        warehouse_no: row.get(0)?,
        part_code: row.get(1)?,
        receipt_doc_no: row.get(2)?,
        received_date: row.get(3)?,
        qty: row.get(4)?,
        contract_no: row.get(5)?,
        contract_price: row.get(6)?,
    })
}

fn map_contract_priority(row: &Row<'_>) -> rusqlite::Result<ContractPriority> {
    Ok(ContractPriority {
        contract_no: row.get(0)?,
        part_code: row.get(1)?,
        plan_qty: row.get(2)?,
        end_date: row.get(3)?,
        total_plan_qty: row.get(4)?,
        priority: row.get(5)?,
    })
}

// ==========================================
// AnalyticsRepository - 分析查询仓储
// ==========================================
pub struct AnalyticsRepository {
    gateway: StorageGateway,
}

impl AnalyticsRepository {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 合同单价严格大于 `price_threshold` 的到货
    ///
    /// 到货与合同按 (contract_no, part_code) 关联。
    /// 排序: received_date 升序；同日按 warehouse_no、receipt_doc_no 升序。
    pub async fn deliveries_above_price(
        &self,
        price_threshold: f64,
    ) -> RepositoryResult<Vec<PriceThresholdDelivery>> {
        self.gateway
            .query(
                r#"
                SELECT d.warehouse_no, d.part_code, d.receipt_doc_no, d.received_date,
                       d.qty, d.contract_no, c.contract_price
                FROM deliveries d
                JOIN contracts c
                  ON c.contract_no = d.contract_no
                 AND c.part_code = d.part_code
                WHERE c.contract_price > ?1
                ORDER BY d.received_date, d.warehouse_no, d.receipt_doc_no
                "#,
                vec![Value::from(price_threshold)],
                map_price_threshold_delivery,
            )
            .await
    }

    /// 单价大于 100 的合同按到期日排优先级
    ///
    /// - total_plan_qty: 同一 contract_no 下入选行的 plan_qty 之和
    /// - priority: end_date 的 DENSE_RANK（并列同名次、名次不跳号）
    /// 排序: end_date 升序；同日按 contract_no、part_code 升序。
    pub async fn contract_priorities(&self) -> RepositoryResult<Vec<ContractPriority>> {
        self.gateway
            .query(
                r#"
                SELECT contract_no, part_code, plan_qty, end_date,
                       SUM(plan_qty) OVER (PARTITION BY contract_no) AS total_plan_qty,
                       DENSE_RANK() OVER (ORDER BY end_date) AS priority
                FROM contracts
                WHERE contract_price > ?1
                ORDER BY end_date, contract_no, part_code
                "#,
                vec![Value::from(PRIORITY_PRICE_FLOOR)],
                map_contract_priority,
            )
            .await
    }

    /// plan_qty 大于 `plan_threshold`，且至少有一个仓库在该合同零件上的
    /// 每一笔到货都严格大于 `delivery_threshold` 的合同
    ///
    /// “某仓全部到货 > D” 等价于 “该仓分组 MIN(qty) > D”。
    /// 排序: contract_no、part_code 升序。
    pub async fn contracts_with_bulk_warehouse(
        &self,
        plan_threshold: f64,
        delivery_threshold: f64,
    ) -> RepositoryResult<Vec<Contract>> {
        self.gateway
            .query(
                r#"
                SELECT c.contract_no, c.part_code, c.unit, c.start_date, c.end_date,
                       c.plan_qty, c.contract_price
                FROM contracts c
                WHERE c.plan_qty > ?1
                  AND EXISTS (
                      SELECT 1
                      FROM deliveries d
                      WHERE d.contract_no = c.contract_no
                        AND d.part_code = c.part_code
                      GROUP BY d.warehouse_no
                      HAVING MIN(d.qty) > ?2
                  )
                ORDER BY c.contract_no, c.part_code
                "#,
                vec![Value::from(plan_threshold), Value::from(delivery_threshold)],
                map_contract,
            )
            .await
    }
}
