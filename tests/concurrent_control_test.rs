// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证并发写入与并发过程调用下的结果隔离
// ==========================================

mod test_helpers;

use std::sync::Arc;

use supply_contracts::api::{ApiError, DeliveryApi, DeliveryInput, ProcedureApi};
use supply_contracts::repository::StorageGateway;
use tempfile::NamedTempFile;

use test_helpers::{count_rows, create_test_db, insert_contract, insert_delivery, insert_warehouse, open};

const TASKS: i64 = 16;

fn setup() -> (NamedTempFile, String, StorageGateway) {
    let (file, db_path) = create_test_db().unwrap();
    let conn = open(&db_path);

    insert_warehouse(&conn, "Ivanov");
    for contract_no in 1..=TASKS {
        insert_contract(&conn, contract_no, "A", "2024-01-01", "2024-12-31", 100.0, 10.0);
        // 合同 n 的到货总量为 n * 3
        insert_delivery(&conn, 1, contract_no, contract_no, "A", (contract_no * 3) as f64, "2024-06-01");
    }

    let gateway = StorageGateway::new(db_path.clone());
    (file, db_path, gateway)
}

fn input(doc: i64) -> DeliveryInput {
    DeliveryInput {
        warehouse_no: 1,
        receipt_doc_no: doc,
        contract_no: 1,
        part_code: "A".to_string(),
        unit: "pcs".to_string(),
        qty: 1.0,
        received_date: "2024-07-01".to_string(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_with_distinct_keys() {
    let (_file, db_path, gateway) = setup();
    let api = Arc::new(DeliveryApi::new(gateway));

    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.create_delivery(&input(1_000 + i)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(count_rows(&open(&db_path), "deliveries"), TASKS * 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_same_key_exactly_one_wins() {
    let (_file, db_path, gateway) = setup();
    let api = Arc::new(DeliveryApi::new(gateway));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.create_delivery(&input(5_000)).await })
        })
        .collect();

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(ApiError::DuplicateKey(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(count_rows(&open(&db_path), "deliveries"), TASKS + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_summaries_do_not_see_each_other() {
    let (_file, _db_path, gateway) = setup();
    let api = Arc::new(ProcedureApi::new(gateway));

    let handles: Vec<_> = (1..=TASKS)
        .map(|contract_no| {
            let api = Arc::clone(&api);
            tokio::spawn(async move {
                let summary = api.contract_summary(contract_no, "A").await?;
                Ok::<_, ApiError>((contract_no, summary))
            })
        })
        .collect();

    for handle in handles {
        let (contract_no, summary) = handle.await.unwrap().unwrap();
        assert_eq!(summary.contract_no, contract_no);
        assert_eq!(summary.total_delivered, (contract_no * 3) as f64);
        assert_eq!(summary.contract_price, Some(10.0));
    }
}
