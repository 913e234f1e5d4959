// ==========================================
// 供货合同系统 - 仓库数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::warehouse::Warehouse;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::gateway::{text_param, StorageGateway};

fn map_warehouse(row: &Row<'_>) -> rusqlite::Result<Warehouse> {
    Ok(Warehouse {
        warehouse_no: row.get(0)?,
        manager_surname: row.get(1)?,
    })
}

// ==========================================
// WarehouseRepository - 仓库仓储
// ==========================================
/// 仓库仓储
/// 职责: 管理 warehouses 表的读写
pub struct WarehouseRepository {
    gateway: StorageGateway,
}

impl WarehouseRepository {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 查询全部仓库（按编号升序）
    pub async fn list(&self) -> RepositoryResult<Vec<Warehouse>> {
        self.gateway
            .query(
                "SELECT warehouse_no, manager_surname FROM warehouses ORDER BY warehouse_no",
                vec![],
                map_warehouse,
            )
            .await
    }

    /// 按编号查询
    pub async fn find_by_no(&self, warehouse_no: i64) -> RepositoryResult<Option<Warehouse>> {
        self.gateway
            .query_optional(
                "SELECT warehouse_no, manager_surname FROM warehouses WHERE warehouse_no = ?1",
                vec![Value::from(warehouse_no)],
                map_warehouse,
            )
            .await
    }

    /// 仓库是否存在
    pub fn exists_in(conn: &Connection, warehouse_no: i64) -> RepositoryResult<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM warehouses WHERE warehouse_no = ?1",
                params![warehouse_no],
                |_row| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// 新建仓库，返回数据库分配的编号
    pub async fn insert(&self, manager_surname: &str) -> RepositoryResult<i64> {
        let surname = manager_surname.to_owned();
        self.gateway
            .with_connection("warehouse.insert", move |conn| -> RepositoryResult<i64> {
                conn.execute(
                    "INSERT INTO warehouses (manager_surname) VALUES (?1)",
                    [&surname],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    /// 更新负责人；仓库不存在时返回 NotFound
    pub async fn update(&self, warehouse_no: i64, manager_surname: &str) -> RepositoryResult<()> {
        let affected = self
            .gateway
            .execute(
                "UPDATE warehouses SET manager_surname = ?1 WHERE warehouse_no = ?2",
                vec![text_param(manager_surname), Value::from(warehouse_no)],
            )
            .await?;

        if affected == 0 {
            return Err(RepositoryError::not_found("Warehouse", warehouse_no));
        }
        Ok(())
    }
}
