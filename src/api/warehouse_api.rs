// ==========================================
// 供货合同系统 - 仓库 API
// ==========================================

use crate::api::error::{ApiError, ApiResult, RepositoryResultExt};
use crate::domain::warehouse::Warehouse;
use crate::repository::gateway::StorageGateway;
use crate::repository::warehouse_repo::WarehouseRepository;

pub struct WarehouseApi {
    warehouse_repo: WarehouseRepository,
}

impl WarehouseApi {
    pub fn new(gateway: StorageGateway) -> Self {
        Self {
            warehouse_repo: WarehouseRepository::new(gateway),
        }
    }

    /// 仓库列表
    pub async fn list_warehouses(&self) -> ApiResult<Vec<Warehouse>> {
        self.warehouse_repo
            .list()
            .await
            .context(|| "查询仓库列表")
    }

    pub async fn get_warehouse(&self, warehouse_no: i64) -> ApiResult<Warehouse> {
        self.warehouse_repo
            .find_by_no(warehouse_no)
            .await
            .context(|| format!("查询仓库 {}", warehouse_no))?
            .ok_or_else(|| ApiError::NotFound(format!("Warehouse({})", warehouse_no)))
    }

    /// 新建仓库，返回分配的仓库编号
    pub async fn create_warehouse(&self, manager_surname: &str) -> ApiResult<i64> {
        let surname = validate_surname(manager_surname)?;
        let warehouse_no = self
            .warehouse_repo
            .insert(surname)
            .await
            .context(|| "新建仓库")?;

        tracing::info!(warehouse_no, "仓库已创建");
        Ok(warehouse_no)
    }

    /// 更新仓库负责人
    pub async fn update_warehouse(&self, warehouse_no: i64, manager_surname: &str) -> ApiResult<()> {
        let surname = validate_surname(manager_surname)?;
        self.warehouse_repo
            .update(warehouse_no, surname)
            .await
            .context(|| format!("更新仓库 {}", warehouse_no))?;

        tracing::info!(warehouse_no, "仓库已更新");
        Ok(())
    }
}

fn validate_surname(raw: &str) -> ApiResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError("manager_surname 不能为空".to_string()));
    }
    Ok(trimmed)
}
