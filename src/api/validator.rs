// ==========================================
// 供货合同系统 - 到货写入校验器
// ==========================================
// 职责: 每次到货新建/更新前重新核对所引用合同的有效期
// 规则:
// 1. 日期必须是 YYYY-MM-DD 日历日，否则拒绝（ValidationError）
// 2. 合同 (contract_no, part_code) 必须存在（ReferenceNotFound）
// 3. start_date <= received_date <= end_date（IntervalViolation）
// 4. 新建时 (warehouse_no, receipt_doc_no) 不得重复（DuplicateKey）
// 说明: 2~4 与写入在同一 IMMEDIATE 事务内完成，
//       校验通过到写入之间合同不会被并发修改
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::contract::{Contract, ContractKey};
use crate::domain::delivery::Delivery;
use crate::domain::types::parse_calendar_date;
use crate::repository::contract_repo::ContractRepository;
use crate::repository::delivery_repo::DeliveryRepository;
use crate::repository::gateway::StorageGateway;
use crate::repository::warehouse_repo::WarehouseRepository;

// ==========================================
// DeliveryInput - 到货写入请求
// ==========================================
/// 到货写入请求（日期为调用方原始文本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInput {
    pub warehouse_no: i64,
    pub receipt_doc_no: i64,
    pub contract_no: i64,
    pub part_code: String,
    pub unit: String,
    pub qty: f64,
    pub received_date: String,
}

impl DeliveryInput {
    /// 校验标量字段并转换为领域对象
    pub fn to_delivery(&self) -> ApiResult<Delivery> {
        let received_date = parse_calendar_date(&self.received_date).map_err(|e| {
            ApiError::ValidationError(format!(
                "received_date 格式错误（应为 YYYY-MM-DD）: {:?}: {}",
                self.received_date, e
            ))
        })?;

        require_text("part_code", &self.part_code)?;
        require_text("unit", &self.unit)?;
        if !self.qty.is_finite() || self.qty < 0.0 {
            return Err(ApiError::ValidationError(format!(
                "qty 必须是非负有限数: {}",
                self.qty
            )));
        }

        Ok(Delivery {
            warehouse_no: self.warehouse_no,
            receipt_doc_no: self.receipt_doc_no,
            contract_no: self.contract_no,
            part_code: self.part_code.clone(),
            unit: self.unit.clone(),
            qty: self.qty,
            received_date,
        })
    }
}

/// 非空文本校验，且不得包含 NUL
pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("{} 不能为空", field)));
    }
    if value.contains('\0') {
        return Err(ApiError::ValidationError(format!("{} 含有非法字符", field)));
    }
    Ok(())
}

/// 有效期检查（闭区间）
pub fn check_interval(received_date: NaiveDate, contract: &Contract) -> ApiResult<()> {
    let inside = contract
        .interval()
        .is_some_and(|interval| interval.contains(received_date));
    if !inside {
        return Err(ApiError::IntervalViolation {
            date: received_date,
            start: contract.start_date,
            end: contract.end_date,
        });
    }
    Ok(())
}

/// 写入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

// ==========================================
// DeliveryWriteValidator - 到货写入校验器
// ==========================================
pub struct DeliveryWriteValidator {
    gateway: StorageGateway,
}

impl DeliveryWriteValidator {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 校验后新建到货
    pub async fn create(&self, input: &DeliveryInput) -> ApiResult<Delivery> {
        self.write(input, WriteMode::Create).await
    }

    /// 校验后按 (warehouse_no, receipt_doc_no) 改写到货
    ///
    /// 改挂到其他合同时按新合同的有效期校验
    pub async fn update(&self, input: &DeliveryInput) -> ApiResult<Delivery> {
        self.write(input, WriteMode::Update).await
    }

    async fn write(&self, input: &DeliveryInput, mode: WriteMode) -> ApiResult<Delivery> {
        let delivery = match input.to_delivery() {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(?mode, error = %e, "到货写入参数被拒绝");
                return Err(e);
            }
        };

        let result = self
            .gateway
            .transaction("delivery.write", move |tx, cancel| -> ApiResult<Delivery> {
                let contract_key = delivery.contract_key();
                let contract = ContractRepository::find_in(tx, &contract_key)?
                    .ok_or_else(|| reference_not_found(&contract_key))?;

                check_interval(delivery.received_date, &contract)?;
                cancel.check()?;

                match mode {
                    WriteMode::Create => {
                        if DeliveryRepository::exists_in(tx, delivery.key())? {
                            return Err(ApiError::DuplicateKey(format!(
                                "Delivery({})",
                                delivery.key()
                            )));
                        }
                        if !WarehouseRepository::exists_in(tx, delivery.warehouse_no)? {
                            return Err(ApiError::NotFound(format!(
                                "Warehouse({})",
                                delivery.warehouse_no
                            )));
                        }
                        cancel.check()?;
                        DeliveryRepository::insert_in(tx, &delivery)?;
                    }
                    WriteMode::Update => {
                        if DeliveryRepository::update_in(tx, &delivery)? == 0 {
                            return Err(ApiError::NotFound(format!("Delivery({})", delivery.key())));
                        }
                    }
                }
                Ok(delivery)
            })
            .await;

        match &result {
            Ok(d) => tracing::info!(?mode, key = %d.key(), contract = %d.contract_key(), "到货写入成功"),
            Err(e) => tracing::warn!(?mode, error = %e, "到货写入失败"),
        }
        result
    }
}

fn reference_not_found(key: &ContractKey) -> ApiError {
    ApiError::ReferenceNotFound {
        contract_no: key.contract_no,
        part_code: key.part_code.clone(),
    }
}
