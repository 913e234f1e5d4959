// ==========================================
// 供货合同系统 - 合同 API
// ==========================================
// 写路径策略: 输入不合法直接拒绝（ValidationError）
// - 日期必须是 YYYY-MM-DD
// - start_date <= end_date
// - plan_qty / contract_price 为非负有限数
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult, RepositoryResultExt};
use crate::api::validator::require_text;
use crate::domain::contract::{Contract, ContractKey};
use crate::domain::types::{parse_calendar_date, ValidityInterval};
use crate::repository::contract_repo::ContractRepository;
use crate::repository::gateway::StorageGateway;

/// 合同写入请求（日期为调用方原始文本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInput {
    pub contract_no: i64,
    pub part_code: String,
    pub unit: String,
    pub start_date: String,
    pub end_date: String,
    pub plan_qty: f64,
    pub contract_price: f64,
}

impl ContractInput {
    pub fn to_contract(&self) -> ApiResult<Contract> {
        let start_date = parse_date_field("start_date", &self.start_date)?;
        let end_date = parse_date_field("end_date", &self.end_date)?;
        if ValidityInterval::new(start_date, end_date).is_none() {
            return Err(ApiError::ValidationError(format!(
                "start_date {} 晚于 end_date {}",
                start_date, end_date
            )));
        }

        require_text("part_code", &self.part_code)?;
        require_text("unit", &self.unit)?;
        require_non_negative("plan_qty", self.plan_qty)?;
        require_non_negative("contract_price", self.contract_price)?;

        Ok(Contract {
            contract_no: self.contract_no,
            part_code: self.part_code.clone(),
            unit: self.unit.clone(),
            start_date,
            end_date,
            plan_qty: self.plan_qty,
            contract_price: self.contract_price,
        })
    }
}

fn parse_date_field(field: &str, raw: &str) -> ApiResult<chrono::NaiveDate> {
    parse_calendar_date(raw).map_err(|e| {
        ApiError::ValidationError(format!("{} 格式错误（应为 YYYY-MM-DD）: {:?}: {}", field, raw, e))
    })
}

fn require_non_negative(field: &str, value: f64) -> ApiResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::ValidationError(format!(
            "{} 必须是非负有限数: {}",
            field, value
        )));
    }
    Ok(())
}

// ==========================================
// ContractApi - 合同 API
// ==========================================
pub struct ContractApi {
    contract_repo: ContractRepository,
}

impl ContractApi {
    pub fn new(gateway: StorageGateway) -> Self {
        Self {
            contract_repo: ContractRepository::new(gateway),
        }
    }

    /// 合同列表
    pub async fn list_contracts(&self) -> ApiResult<Vec<Contract>> {
        self.contract_repo.list().await.context(|| "查询合同列表")
    }

    /// 按主键查询合同
    pub async fn get_contract(&self, contract_no: i64, part_code: &str) -> ApiResult<Contract> {
        let key = ContractKey::new(contract_no, part_code);
        self.contract_repo
            .find_by_key(&key)
            .await
            .context(|| format!("查询合同 {}", key))?
            .ok_or_else(|| ApiError::NotFound(format!("Contract({})", key)))
    }

    /// 新建合同；主键重复返回 DuplicateKey
    pub async fn create_contract(&self, input: &ContractInput) -> ApiResult<Contract> {
        let contract = input.to_contract()?;
        self.contract_repo
            .insert(&contract)
            .await
            .context(|| format!("新建合同 {}", contract.key()))?;

        tracing::info!(key = %contract.key(), "合同已创建");
        Ok(contract)
    }

    /// 更新合同可变字段（单位/有效期/数量/单价）；合同不存在返回 NotFound
    pub async fn update_contract(&self, input: &ContractInput) -> ApiResult<Contract> {
        let contract = input.to_contract()?;
        self.contract_repo
            .update(&contract)
            .await
            .context(|| format!("更新合同 {}", contract.key()))?;

        tracing::info!(key = %contract.key(), "合同已更新");
        Ok(contract)
    }
}
