// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据写入等功能
// 说明: 测试数据直接写库，绕过写入校验器
// ==========================================

#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

use supply_contracts::db::install_schema;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = Connection::open(&db_path)?;
    install_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试库连接（开启外键）
pub fn open(db_path: &str) -> Connection {
    let conn = Connection::open(db_path).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    conn
}

/// 写入仓库，返回分配的编号
pub fn insert_warehouse(conn: &Connection, surname: &str) -> i64 {
    conn.execute(
        "INSERT INTO warehouses (manager_surname) VALUES (?1)",
        params![surname],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// 写入合同（日期为 YYYY-MM-DD 文本）
pub fn insert_contract(
    conn: &Connection,
    contract_no: i64,
    part_code: &str,
    start_date: &str,
    end_date: &str,
    plan_qty: f64,
    contract_price: f64,
) {
    conn.execute(
        r#"
        INSERT INTO contracts
            (contract_no, part_code, unit, start_date, end_date, plan_qty, contract_price)
        VALUES (?1, ?2, 'pcs', ?3, ?4, ?5, ?6)
        "#,
        params![contract_no, part_code, start_date, end_date, plan_qty, contract_price],
    )
    .unwrap();
}

/// 写入到货
pub fn insert_delivery(
    conn: &Connection,
    warehouse_no: i64,
    receipt_doc_no: i64,
    contract_no: i64,
    part_code: &str,
    qty: f64,
    received_date: &str,
) {
    conn.execute(
        r#"
        INSERT INTO deliveries
            (warehouse_no, receipt_doc_no, contract_no, part_code, unit, qty, received_date)
        VALUES (?1, ?2, ?3, ?4, 'pcs', ?5, ?6)
        "#,
        params![warehouse_no, receipt_doc_no, contract_no, part_code, qty, received_date],
    )
    .unwrap();
}

/// 表行数
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}
