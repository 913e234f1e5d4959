// ==========================================
// 供货合同系统 - 到货数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 写入方法只接受连接/事务参数，
//       强制调用方经由写入校验器（同一事务内完成合同有效期校验）
// ==========================================

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::delivery::{Delivery, DeliveryKey};
use crate::domain::report::DeliveryView;
use crate::domain::types::format_date;
use crate::repository::error::RepositoryResult;
use crate::repository::gateway::StorageGateway;

const DELIVERY_COLUMNS: &str =
    "warehouse_no, receipt_doc_no, contract_no, part_code, unit, qty, received_date";

fn map_delivery(row: &Row<'_>) -> rusqlite::Result<Delivery> {
    Ok(Delivery {
        warehouse_no: row.get(0)?,
        receipt_doc_no: row.get(1)?,
        contract_no: row.get(2)?,
        part_code: row.get(3)?,
        unit: row.get(4)?,
        qty: row.get(5)?,
        received_date: row.get(6)?,
    })
}

fn map_view(row: &Row<'_>) -> rusqlite::Result<DeliveryView> {
    Ok(DeliveryView {
        warehouse_no: row.get(0)?,
        manager_surname: row.get(1)?,
        receipt_doc_no: row.get(2)?,
        received_date: row.get(3)?,
        qty: row.get(4)?,
        delivery_unit: row.get(5)?,
        contract_no: row.get(6)?,
        part_code: row.get(7)?,
        contract_unit: row.get(8)?,
        start_date: row.get(9)?,
        end_date: row.get(10)?,
        plan_qty: row.get(11)?,
        contract_price: row.get(12)?,
    })
}

// ==========================================
// DeliveryRepository - 到货仓储
// ==========================================
/// 到货仓储
/// 职责: deliveries 表读写 + full_deliveries_view 读取
pub struct DeliveryRepository {
    gateway: StorageGateway,
}

impl DeliveryRepository {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 查询全部到货（按仓库、入库单号升序）
    pub async fn list(&self) -> RepositoryResult<Vec<Delivery>> {
        let sql = format!(
            "SELECT {} FROM deliveries ORDER BY warehouse_no, receipt_doc_no",
            DELIVERY_COLUMNS
        );
        self.gateway.query(&sql, vec![], map_delivery).await
    }

    /// 查询全量到货视图
    pub async fn list_view(&self) -> RepositoryResult<Vec<DeliveryView>> {
        self.gateway
            .query(
                r#"
                SELECT
                    warehouse_no, manager_surname,
                    receipt_doc_no, received_date, qty, delivery_unit,
                    contract_no, part_code,
                    contract_unit, start_date, end_date, plan_qty, contract_price
                FROM full_deliveries_view
                ORDER BY warehouse_no, receipt_doc_no
                "#,
                vec![],
                map_view,
            )
            .await
    }

    /// 按主键查询
    pub async fn find_by_key(&self, key: DeliveryKey) -> RepositoryResult<Option<Delivery>> {
        let sql = format!(
            "SELECT {} FROM deliveries WHERE warehouse_no = ?1 AND receipt_doc_no = ?2",
            DELIVERY_COLUMNS
        );
        self.gateway
            .query_optional(
                &sql,
                vec![Value::from(key.warehouse_no), Value::from(key.receipt_doc_no)],
                map_delivery,
            )
            .await
    }

    /// 主键是否已存在
    pub fn exists_in(conn: &Connection, key: DeliveryKey) -> RepositoryResult<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM deliveries WHERE warehouse_no = ?1 AND receipt_doc_no = ?2",
                params![key.warehouse_no, key.receipt_doc_no],
                |_row| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// 插入到货
    pub fn insert_in(conn: &Connection, delivery: &Delivery) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO deliveries (
                warehouse_no, receipt_doc_no, contract_no, part_code, unit, qty, received_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                delivery.warehouse_no,
                delivery.receipt_doc_no,
                delivery.contract_no,
                delivery.part_code,
                delivery.unit,
                delivery.qty,
                format_date(delivery.received_date),
            ],
        )?;
        Ok(())
    }

    /// 按主键改写全部非主键字段，返回受影响行数
    pub fn update_in(conn: &Connection, delivery: &Delivery) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE deliveries
            SET contract_no = ?3, part_code = ?4, unit = ?5, qty = ?6, received_date = ?7
            WHERE warehouse_no = ?1 AND receipt_doc_no = ?2
            "#,
            params![
                delivery.warehouse_no,
                delivery.receipt_doc_no,
                delivery.contract_no,
                delivery.part_code,
                delivery.unit,
                delivery.qty,
                format_date(delivery.received_date),
            ],
        )?;
        Ok(affected)
    }
}
