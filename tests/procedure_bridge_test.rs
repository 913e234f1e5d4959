// ==========================================
// 合同执行汇总过程集成测试
// ==========================================
// 测试目标: 汇总正确、合同不存在不报错、零件号带引号/恶意文本不改变语句结构
// ==========================================

mod test_helpers;

use supply_contracts::api::ProcedureApi;
use supply_contracts::repository::StorageGateway;
use tempfile::NamedTempFile;

use test_helpers::{
    count_rows, create_test_db, insert_contract, insert_delivery, insert_warehouse, open,
};

fn setup() -> (NamedTempFile, String, ProcedureApi) {
    let (file, db_path) = create_test_db().unwrap();
    let conn = open(&db_path);

    insert_warehouse(&conn, "Ivanov");
    insert_warehouse(&conn, "O'Brien");
    insert_contract(&conn, 1, "A", "2024-01-01", "2024-12-31", 1000.0, 150.0);
    insert_contract(&conn, 1, "B", "2024-01-01", "2024-12-31", 1000.0, 75.0);
    insert_contract(&conn, 5, "O'Brien", "2024-01-01", "2024-12-31", 10.0, 42.5);

    insert_delivery(&conn, 1, 1, 1, "A", 40.0, "2024-03-01");
    insert_delivery(&conn, 2, 1, 1, "A", 60.5, "2024-04-01");
    insert_delivery(&conn, 1, 2, 1, "B", 999.0, "2024-04-01");
    insert_delivery(&conn, 2, 2, 5, "O'Brien", 3.0, "2024-05-01");

    let api = ProcedureApi::new(StorageGateway::new(db_path.clone()));
    (file, db_path, api)
}

#[tokio::test]
async fn test_summary_sums_only_matching_part() {
    let (_file, _db_path, api) = setup();

    let summary = api.contract_summary(1, "A").await.unwrap();
    assert_eq!(summary.contract_no, 1);
    assert_eq!(summary.part_code, "A");
    assert_eq!(summary.total_delivered, 100.5);
    assert_eq!(summary.contract_price, Some(150.0));
}

#[tokio::test]
async fn test_summary_for_missing_contract_is_zero_without_price() {
    let (_file, _db_path, api) = setup();

    let summary = api.contract_summary(42, "nope").await.unwrap();
    assert_eq!(summary.total_delivered, 0.0);
    assert_eq!(summary.contract_price, None);
}

#[tokio::test]
async fn test_summary_for_blank_part_code_is_zero_without_price() {
    let (_file, _db_path, api) = setup();

    for part_code in ["", "   "] {
        let summary = api.contract_summary(1, part_code).await.unwrap();
        assert_eq!(summary.contract_no, 1);
        assert_eq!(summary.part_code, part_code);
        assert_eq!(summary.total_delivered, 0.0);
        assert_eq!(summary.contract_price, None);
    }
}

#[tokio::test]
async fn test_summary_for_contract_without_deliveries() {
    let (_file, db_path, api) = setup();
    insert_contract(&open(&db_path), 9, "E", "2024-01-01", "2024-12-31", 1.0, 5.0);

    let summary = api.contract_summary(9, "E").await.unwrap();
    assert_eq!(summary.total_delivered, 0.0);
    assert_eq!(summary.contract_price, Some(5.0));
}

#[tokio::test]
async fn test_summary_with_quote_in_part_code() {
    let (_file, _db_path, api) = setup();

    let summary = api.contract_summary(5, "O'Brien").await.unwrap();
    assert_eq!(summary.total_delivered, 3.0);
    assert_eq!(summary.contract_price, Some(42.5));
}

#[tokio::test]
async fn test_hostile_part_code_is_treated_as_data() {
    let (_file, db_path, api) = setup();

    for hostile in [
        "x'); DROP TABLE contracts; --",
        "A' OR '1'='1",
        "'; DELETE FROM deliveries; SELECT '",
    ] {
        let summary = api.contract_summary(1, hostile).await.unwrap();
        assert_eq!(summary.part_code, hostile);
        assert_eq!(summary.total_delivered, 0.0);
        assert_eq!(summary.contract_price, None);
    }

    let conn = open(&db_path);
    assert_eq!(count_rows(&conn, "contracts"), 3);
    assert_eq!(count_rows(&conn, "deliveries"), 4);
}

#[tokio::test]
async fn test_result_table_keeps_single_row_and_calls_are_cleared() {
    let (_file, db_path, api) = setup();

    api.contract_summary(1, "A").await.unwrap();
    api.contract_summary(1, "B").await.unwrap();

    let conn = open(&db_path);
    assert_eq!(count_rows(&conn, "proc_result"), 1);
    assert_eq!(count_rows(&conn, "contract_summary_calls"), 0);

    let last: f64 = conn
        .query_row("SELECT total_delivered FROM proc_result", [], |row| row.get(0))
        .unwrap();
    assert_eq!(last, 999.0);
}
