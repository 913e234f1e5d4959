// ==========================================
// 供货合同系统 - 到货 API
// ==========================================
// 写路径统一经过 DeliveryWriteValidator
// ==========================================

use crate::api::error::{ApiError, ApiResult, RepositoryResultExt};
use crate::api::validator::{DeliveryInput, DeliveryWriteValidator};
use crate::domain::delivery::{Delivery, DeliveryKey};
use crate::domain::report::DeliveryView;
use crate::repository::delivery_repo::DeliveryRepository;
use crate::repository::gateway::StorageGateway;

pub struct DeliveryApi {
    delivery_repo: DeliveryRepository,
    validator: DeliveryWriteValidator,
}

impl DeliveryApi {
    pub fn new(gateway: StorageGateway) -> Self {
        Self {
            delivery_repo: DeliveryRepository::new(gateway.clone()),
            validator: DeliveryWriteValidator::new(gateway),
        }
    }

    /// 到货列表（按仓库、单据号排序）
    pub async fn list_deliveries(&self) -> ApiResult<Vec<Delivery>> {
        self.delivery_repo.list().await.context(|| "查询到货列表")
    }

    /// 全量到货视图（仓库 + 到货 + 合同）
    pub async fn list_delivery_view(&self) -> ApiResult<Vec<DeliveryView>> {
        self.delivery_repo
            .list_view()
            .await
            .context(|| "查询全量到货视图")
    }

    pub async fn get_delivery(&self, warehouse_no: i64, receipt_doc_no: i64) -> ApiResult<Delivery> {
        let key = DeliveryKey {
            warehouse_no,
            receipt_doc_no,
        };
        self.delivery_repo
            .find_by_key(key)
            .await
            .context(|| format!("查询到货 {}", key))?
            .ok_or_else(|| ApiError::NotFound(format!("Delivery({})", key)))
    }

    /// 新建到货（校验合同存在与有效期）
    pub async fn create_delivery(&self, input: &DeliveryInput) -> ApiResult<Delivery> {
        self.validator.create(input).await
    }

    /// 改写到货（可改挂合同，按新合同有效期校验）
    pub async fn update_delivery(&self, input: &DeliveryInput) -> ApiResult<Delivery> {
        self.validator.update(input).await
    }
}
