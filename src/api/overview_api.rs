// ==========================================
// 供货合同系统 - 总览 API
// ==========================================
// 首页数据集: 仓库 + 合同 + 到货，三路并发读取
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiResult, RepositoryResultExt};
use crate::domain::contract::Contract;
use crate::domain::delivery::Delivery;
use crate::domain::warehouse::Warehouse;
use crate::repository::contract_repo::ContractRepository;
use crate::repository::delivery_repo::DeliveryRepository;
use crate::repository::gateway::StorageGateway;
use crate::repository::warehouse_repo::WarehouseRepository;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyOverview {
    pub warehouses: Vec<Warehouse>,
    pub contracts: Vec<Contract>,
    pub deliveries: Vec<Delivery>,
}

pub struct OverviewApi {
    warehouse_repo: WarehouseRepository,
    contract_repo: ContractRepository,
    delivery_repo: DeliveryRepository,
}

impl OverviewApi {
    pub fn new(gateway: StorageGateway) -> Self {
        Self {
            warehouse_repo: WarehouseRepository::new(gateway.clone()),
            contract_repo: ContractRepository::new(gateway.clone()),
            delivery_repo: DeliveryRepository::new(gateway),
        }
    }

    /// 任一路失败即整体失败，其余进行中的读取随 future 丢弃而中断
    pub async fn overview(&self) -> ApiResult<SupplyOverview> {
        let (warehouses, contracts, deliveries) = futures::try_join!(
            async { self.warehouse_repo.list().await.context(|| "总览: 查询仓库") },
            async { self.contract_repo.list().await.context(|| "总览: 查询合同") },
            async { self.delivery_repo.list().await.context(|| "总览: 查询到货") },
        )?;

        Ok(SupplyOverview {
            warehouses,
            contracts,
            deliveries,
        })
    }
}
