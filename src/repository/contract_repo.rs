// ==========================================
// 供货合同系统 - 合同数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（有效期校验在 API 层）
// ==========================================

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::contract::{Contract, ContractKey};
use crate::domain::types::format_date;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::gateway::{text_param, StorageGateway};

/// contracts 表标准列顺序，与 `map_contract` 对齐
pub(crate) const CONTRACT_COLUMNS: &str =
    "contract_no, part_code, unit, start_date, end_date, plan_qty, contract_price";

pub(crate) fn map_contract(row: &Row<'_>) -> rusqlite::Result<Contract> {
    Ok(Contract {
        contract_no: row.get(0)?,
        part_code: row.get(1)?,
        unit: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        plan_qty: row.get(5)?,
        contract_price: row.get(6)?,
    })
}

// ==========================================
// ContractRepository - 合同仓储
// ==========================================
/// 合同仓储
/// 职责: 管理 contracts 表的读写
pub struct ContractRepository {
    gateway: StorageGateway,
}

impl ContractRepository {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 查询全部合同（按合同号、零件号升序）
    pub async fn list(&self) -> RepositoryResult<Vec<Contract>> {
        let sql = format!(
            "SELECT {} FROM contracts ORDER BY contract_no, part_code",
            CONTRACT_COLUMNS
        );
        self.gateway.query(&sql, vec![], map_contract).await
    }

    /// 按复合主键查询
    pub async fn find_by_key(&self, key: &ContractKey) -> RepositoryResult<Option<Contract>> {
        let key = key.clone();
        self.gateway
            .with_connection("contract.find_by_key", move |conn| Self::find_in(conn, &key))
            .await
    }

    /// 在给定连接/事务上按主键查询
    ///
    /// 供需要与写入处于同一事务的调用方使用
    pub fn find_in(conn: &Connection, key: &ContractKey) -> RepositoryResult<Option<Contract>> {
        let sql = format!(
            "SELECT {} FROM contracts WHERE contract_no = ?1 AND part_code = ?2",
            CONTRACT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![key.contract_no, key.part_code], map_contract)
            .optional()?)
    }

    /// 新建合同
    pub async fn insert(&self, contract: &Contract) -> RepositoryResult<()> {
        self.gateway
            .execute(
                r#"
                INSERT INTO contracts (
                    contract_no, part_code, unit, start_date, end_date, plan_qty, contract_price
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                contract_values(contract),
            )
            .await?;
        Ok(())
    }

    /// 更新合同可变字段；合同不存在时返回 NotFound
    pub async fn update(&self, contract: &Contract) -> RepositoryResult<()> {
        let affected = self
            .gateway
            .execute(
                r#"
                UPDATE contracts
                SET unit = ?3, start_date = ?4, end_date = ?5, plan_qty = ?6, contract_price = ?7
                WHERE contract_no = ?1 AND part_code = ?2
                "#,
                contract_values(contract),
            )
            .await?;

        if affected == 0 {
            return Err(RepositoryError::not_found("Contract", contract.key()));
        }
        Ok(())
    }
}

fn contract_values(contract: &Contract) -> Vec<Value> {
    vec![
        Value::from(contract.contract_no),
        text_param(&contract.part_code),
        text_param(&contract.unit),
        Value::Text(format_date(contract.start_date)),
        Value::Text(format_date(contract.end_date)),
        Value::from(contract.plan_qty),
        Value::from(contract.contract_price),
    ]
}
