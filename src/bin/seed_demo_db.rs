// ==========================================
// 供货合同系统 - 演示库重建
// ==========================================
// 用法: seed_demo_db [db_path]
// 旧库先备份为 <db_path>.bak.<时间戳>，然后重建 schema 并写入固定演示数据
// ==========================================

use chrono::Local;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fs;
use std::path::Path;

use supply_contracts::app::get_default_db_path;
use supply_contracts::db::{install_schema, open_sqlite_connection};

const WAREHOUSES: &[&str] = &["Ivanov", "Petrova", "O'Brien"];

// (contract_no, part_code, unit, start_date, end_date, plan_qty, contract_price)
const CONTRACTS: &[(i64, &str, &str, &str, &str, f64, f64)] = &[
    (1, "A", "pcs", "2024-01-01", "2024-12-31", 1000.0, 150.0),
    (1, "B", "kg", "2024-01-01", "2024-06-30", 2500.0, 80.0),
    (2, "A", "pcs", "2024-03-01", "2025-02-28", 1500.0, 210.0),
    (2, "C-7", "m", "2024-03-01", "2024-12-31", 400.0, 120.0),
    (3, "O'Ring", "pcs", "2024-05-01", "2024-12-31", 5000.0, 12.5),
];

// (warehouse_no, receipt_doc_no, contract_no, part_code, unit, qty, received_date)
const DELIVERIES: &[(i64, i64, i64, &str, &str, f64, &str)] = &[
    (1, 1, 1, "A", "pcs", 50.0, "2024-06-15"),
    (1, 2, 1, "A", "pcs", 120.0, "2024-07-01"),
    (2, 1, 1, "A", "pcs", 30.0, "2024-07-20"),
    (1, 3, 1, "B", "kg", 400.0, "2024-02-10"),
    (2, 2, 2, "A", "pcs", 300.0, "2024-04-05"),
    (2, 3, 2, "A", "pcs", 260.0, "2024-09-12"),
    (3, 1, 2, "A", "pcs", 40.0, "2024-10-01"),
    (3, 2, 2, "C-7", "m", 100.0, "2024-08-08"),
    (3, 3, 3, "O'Ring", "pcs", 1000.0, "2024-05-20"),
];

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    backup_and_reset_db(&db_path)?;

    let mut conn = open_sqlite_connection(&db_path)?;
    install_schema(&conn)?;
    seed_demo_data(&mut conn)?;
    print_quick_counts(&conn)?;

    eprintln!("Seeded {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_demo_data(conn: &mut Connection) -> Result<(), Box<dyn Error>> {
    let tx = conn.transaction()?;

    for surname in WAREHOUSES {
        tx.execute(
            "INSERT INTO warehouses (manager_surname) VALUES (?1)",
            params![surname],
        )?;
    }

    for (contract_no, part_code, unit, start, end, plan_qty, price) in CONTRACTS {
        tx.execute(
            r#"
            INSERT INTO contracts
                (contract_no, part_code, unit, start_date, end_date, plan_qty, contract_price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![contract_no, part_code, unit, start, end, plan_qty, price],
        )?;
    }

    for (warehouse_no, doc_no, contract_no, part_code, unit, qty, date) in DELIVERIES {
        tx.execute(
            r#"
            INSERT INTO deliveries
                (warehouse_no, receipt_doc_no, contract_no, part_code, unit, qty, received_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![warehouse_no, doc_no, contract_no, part_code, unit, qty, date],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn print_quick_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let tables = ["warehouses", "contracts", "deliveries", "schema_version"];

    eprintln!("Row counts:");
    for t in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let c: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<16} {}", t, c);
    }
    Ok(())
}
