// ==========================================
// 供货合同系统 - 分析查询 API
// ==========================================
// Q1: 单价超过阈值的到货
// Q2: 高价合同按到期日排优先级
// Q3: plan_qty 超阈值且存在“整仓达标”仓库的合同
// 参数策略: 缺失或无法解析 → 使用默认值，不报错
// ==========================================

use crate::api::error::{ApiResult, RepositoryResultExt};
use crate::api::params::{BulkWarehouseParams, PriceThresholdParams};
use crate::domain::contract::Contract;
use crate::domain::report::{ContractPriority, PriceThresholdDelivery};
use crate::repository::analytics_repo::AnalyticsRepository;
use crate::repository::gateway::StorageGateway;

pub struct AnalyticsApi {
    analytics_repo: AnalyticsRepository,
}

impl AnalyticsApi {
    pub fn new(gateway: StorageGateway) -> Self {
        Self {
            analytics_repo: AnalyticsRepository::new(gateway),
        }
    }

    // ==========================================
    // Q1
    // ==========================================

    pub async fn deliveries_above_price(
        &self,
        params: PriceThresholdParams,
    ) -> ApiResult<Vec<PriceThresholdDelivery>> {
        let rows = self
            .analytics_repo
            .deliveries_above_price(params.price)
            .await
            .context(|| format!("Q1 查询失败 (price > {})", params.price))?;

        tracing::debug!(price = params.price, rows = rows.len(), "Q1 完成");
        Ok(rows)
    }

    /// Q1，阈值为调用方原始文本
    pub async fn deliveries_above_price_raw(
        &self,
        price: Option<&str>,
    ) -> ApiResult<Vec<PriceThresholdDelivery>> {
        self.deliveries_above_price(PriceThresholdParams::from_raw(price))
            .await
    }

    // ==========================================
    // Q2
    // ==========================================

    pub async fn contract_priorities(&self) -> ApiResult<Vec<ContractPriority>> {
        let rows = self
            .analytics_repo
            .contract_priorities()
            .await
            .context(|| "Q2 查询失败")?;

        tracing::debug!(rows = rows.len(), "Q2 完成");
        Ok(rows)
    }

    // ==========================================
    // Q3
    // ==========================================

    pub async fn contracts_with_bulk_warehouse(
        &self,
        params: BulkWarehouseParams,
    ) -> ApiResult<Vec<Contract>> {
        let rows = self
            .analytics_repo
            .contracts_with_bulk_warehouse(params.plan_qty, params.delivery_qty)
            .await
            .context(|| {
                format!(
                    "Q3 查询失败 (plan_qty > {}, delivery_qty > {})",
                    params.plan_qty, params.delivery_qty
                )
            })?;

        tracing::debug!(
            plan_qty = params.plan_qty,
            delivery_qty = params.delivery_qty,
            rows = rows.len(),
            "Q3 完成"
        );
        Ok(rows)
    }

    /// Q3，阈值为调用方原始文本
    pub async fn contracts_with_bulk_warehouse_raw(
        &self,
        plan_qty: Option<&str>,
        delivery_qty: Option<&str>,
    ) -> ApiResult<Vec<Contract>> {
        self.contracts_with_bulk_warehouse(BulkWarehouseParams::from_raw(plan_qty, delivery_qty))
            .await
    }
}
