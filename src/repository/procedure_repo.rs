// ==========================================
// 供货合同系统 - 存储过程桥接
// ==========================================
// 过程: p_contract_summary(contract_no, part_code)
//   -> (total_delivered, contract_price)
// 协议:
// 1. 生成调用语句（向 contract_summary_calls 插入一行，库内触发器执行汇总）
// 2. 过程把结果覆盖写入单行表 proc_result
// 3. 读取 proc_result
// 以上在同一个 IMMEDIATE 事务内完成，避免并发调用读到彼此的结果行
// ==========================================

use async_trait::async_trait;

use crate::domain::contract::ContractKey;
use crate::domain::report::ContractSummary;
use crate::repository::error::RepositoryResult;
use crate::repository::gateway::StorageGateway;

/// 库内汇总过程名
pub const PROCEDURE_NAME: &str = "p_contract_summary";

/// 把任意文本转成 SQL 字符串字面量：两端加单引号，内部每个单引号变成两个
///
/// 生成的字面量在 SQL 词法上恰好是一个字符串 token，输入内容无法闭合它
pub fn quote_literal(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('\'');
    for ch in raw.chars() {
        if ch == '\'' {
            quoted.push('\'');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

/// 生成过程调用语句
///
/// 零件号由调用方提供，只能经 `quote_literal` 进入语句
pub fn call_statement(contract_no: i64, part_code: &str) -> String {
    format!(
        "INSERT INTO contract_summary_calls (contract_no, part_code) VALUES ({}, {})",
        contract_no,
        quote_literal(part_code)
    )
}

// ==========================================
// ContractSummarySource - 合同汇总来源
// ==========================================
/// 合同汇总来源
///
/// 合同不存在时必须返回 total_delivered = 0、contract_price = None，而不是错误
#[async_trait]
pub trait ContractSummarySource: Send + Sync {
    async fn contract_summary(&self, key: &ContractKey) -> RepositoryResult<ContractSummary>;
}

// ==========================================
// ContractSummaryProcedure - 过程调用实现
// ==========================================
pub struct ContractSummaryProcedure {
    gateway: StorageGateway,
}

impl ContractSummaryProcedure {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 调用过程并读取结果行
    pub async fn call(&self, contract_no: i64, part_code: &str) -> RepositoryResult<ContractSummary> {
        let statement = call_statement(contract_no, part_code);
        let part_code = part_code.to_owned();

        tracing::debug!(procedure = PROCEDURE_NAME, contract_no, part_code = %part_code, "调用汇总过程");

        self.gateway
            .transaction(
                "procedure.contract_summary",
                move |tx, cancel| -> RepositoryResult<ContractSummary> {
                    tx.execute(&statement, [])?;
                    cancel.check()?;

                    let (total_delivered, contract_price) = tx.query_row(
                        "SELECT total_delivered, contract_price FROM proc_result",
                        [],
                        |row| Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, Option<f64>>(1)?)),
                    )?;

                    // 调用记录只是触发器入口，不保留
                    tx.execute("DELETE FROM contract_summary_calls", [])?;

                    Ok(ContractSummary {
                        contract_no,
                        part_code,
                        total_delivered: total_delivered.unwrap_or(0.0),
                        contract_price,
                    })
                },
            )
            .await
    }
}

#[async_trait]
impl ContractSummarySource for ContractSummaryProcedure {
    async fn contract_summary(&self, key: &ContractKey) -> RepositoryResult<ContractSummary> {
        self.call(key.contract_no, &key.part_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_doubles_quotes() {
        assert_eq!(quote_literal("A-100"), "'A-100'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal("''"), "''''''");
        assert_eq!(quote_literal(""), "''");
    }

    #[test]
    fn test_quote_literal_keeps_single_token() {
        let quoted = quote_literal("x'); DROP TABLE contracts; --");
        let inner = &quoted[1..quoted.len() - 1];

        // 去掉成对的转义引号后，内部不应再有任何单引号
        assert!(!inner.replace("''", "").contains('\''));
        assert_eq!(inner.matches('\'').count(), 2);
    }

    #[test]
    fn test_call_statement_structure() {
        assert_eq!(
            call_statement(1, "O'Brien"),
            "INSERT INTO contract_summary_calls (contract_no, part_code) VALUES (1, 'O''Brien')"
        );

        let hostile = call_statement(7, "a'), (8, 'b");
        assert_eq!(
            hostile,
            "INSERT INTO contract_summary_calls (contract_no, part_code) VALUES (7, 'a''), (8, ''b')"
        );
    }
}
