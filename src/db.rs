// ==========================================
// 供货合同系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，保证每个连接都开启外键
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供引导用 schema（仓库/合同/到货/视图/存储过程结果表）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 项目不提供迁移工具，`install_schema` 只负责在空库上建表。
/// - 这里的版本号用于**提示/告警**，避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 引导 schema
///
/// 约定：
/// - 日期统一存储为 `YYYY-MM-DD` 文本，字典序即日期序
/// - 到货日期落在合同有效期内的约束**不**在库里实现，由写入校验器负责
/// - `p_contract_summary` 以触发器实现：向 contract_summary_calls 插入一行即“调用”，
///   结果覆盖写入单行表 proc_result
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS warehouses (
    warehouse_no INTEGER PRIMARY KEY AUTOINCREMENT,
    manager_surname TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contracts (
    contract_no INTEGER NOT NULL,
    part_code TEXT NOT NULL,
    unit TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    plan_qty REAL NOT NULL CHECK (plan_qty >= 0),
    contract_price REAL NOT NULL CHECK (contract_price >= 0),
    PRIMARY KEY (contract_no, part_code),
    CHECK (start_date <= end_date)
);

CREATE TABLE IF NOT EXISTS deliveries (
    warehouse_no INTEGER NOT NULL REFERENCES warehouses(warehouse_no),
    receipt_doc_no INTEGER NOT NULL,
    contract_no INTEGER NOT NULL,
    part_code TEXT NOT NULL,
    unit TEXT NOT NULL,
    qty REAL NOT NULL,
    received_date TEXT NOT NULL,
    PRIMARY KEY (warehouse_no, receipt_doc_no),
    FOREIGN KEY (contract_no, part_code) REFERENCES contracts(contract_no, part_code)
);

CREATE INDEX IF NOT EXISTS idx_deliveries_contract
    ON deliveries(contract_no, part_code, warehouse_no);

CREATE VIEW IF NOT EXISTS full_deliveries_view AS
SELECT
    w.warehouse_no,
    w.manager_surname,
    d.receipt_doc_no,
    d.received_date,
    d.qty,
    d.unit AS delivery_unit,
    d.contract_no,
    d.part_code,
    c.unit AS contract_unit,
    c.start_date,
    c.end_date,
    c.plan_qty,
    c.contract_price
FROM deliveries d
JOIN warehouses w ON w.warehouse_no = d.warehouse_no
JOIN contracts c ON c.contract_no = d.contract_no AND c.part_code = d.part_code;

CREATE TABLE IF NOT EXISTS proc_result (
    total_delivered REAL,
    contract_price REAL
);

CREATE TABLE IF NOT EXISTS contract_summary_calls (
    contract_no INTEGER NOT NULL,
    part_code TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS p_contract_summary
AFTER INSERT ON contract_summary_calls
BEGIN
    DELETE FROM proc_result;
    INSERT INTO proc_result (total_delivered, contract_price)
    VALUES (
        (SELECT COALESCE(SUM(d.qty), 0)
           FROM deliveries d
          WHERE d.contract_no = NEW.contract_no AND d.part_code = NEW.part_code),
        (SELECT c.contract_price
           FROM contracts c
          WHERE c.contract_no = NEW.contract_no AND c.part_code = NEW.part_code)
    );
END;
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置（默认 busy_timeout）
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(conn)
}

/// 在空库上安装 schema 并登记版本（幂等）
pub fn install_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 检查库版本，版本落后或缺失时只告警不报错
pub fn warn_on_schema_mismatch(conn: &Connection) {
    match read_schema_version(conn) {
        Ok(Some(v)) if v >= CURRENT_SCHEMA_VERSION => {}
        Ok(Some(v)) => tracing::warn!(
            found = v,
            expected = CURRENT_SCHEMA_VERSION,
            "schema_version 落后于当前代码"
        ),
        Ok(None) => tracing::warn!("数据库缺少 schema_version 表，可能尚未初始化"),
        Err(e) => tracing::warn!("读取 schema_version 失败: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        install_schema(&conn).unwrap();
        install_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_summary_trigger_overwrites_single_row() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn, Duration::from_millis(100)).unwrap();
        install_schema(&conn).unwrap();

        conn.execute_batch(
            r#"
            INSERT INTO warehouses (manager_surname) VALUES ('Ivanov');
            INSERT INTO contracts VALUES (1, 'A', 'pcs', '2024-01-01', '2024-12-31', 1000, 150);
            INSERT INTO deliveries VALUES (1, 1, 1, 'A', 'pcs', 40, '2024-03-01');
            INSERT INTO deliveries VALUES (1, 2, 1, 'A', 'pcs', 60, '2024-04-01');
            INSERT INTO contract_summary_calls VALUES (1, 'A');
            INSERT INTO contract_summary_calls VALUES (9, 'Z');
            "#,
        )
        .unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM proc_result", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        let (total, price): (f64, Option<f64>) = conn
            .query_row("SELECT total_delivered, contract_price FROM proc_result", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(total, 0.0);
        assert_eq!(price, None);
    }
}
