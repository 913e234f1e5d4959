// ==========================================
// 供货合同系统 - 合同执行汇总 API
// ==========================================
// 通过 ContractSummarySource 调用库内过程 p_contract_summary
// 合同不存在不是错误: total_delivered = 0, contract_price = None
// 空白零件号照常下发（查不到合同，得到 0 / None），只拒绝 NUL
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, RepositoryResultExt};
use crate::domain::contract::ContractKey;
use crate::domain::report::ContractSummary;
use crate::repository::gateway::StorageGateway;
use crate::repository::procedure_repo::{ContractSummaryProcedure, ContractSummarySource};

pub struct ProcedureApi {
    source: Arc<dyn ContractSummarySource>,
}

impl ProcedureApi {
    pub fn new(gateway: StorageGateway) -> Self {
        Self::with_source(Arc::new(ContractSummaryProcedure::new(gateway)))
    }

    pub fn with_source(source: Arc<dyn ContractSummarySource>) -> Self {
        Self { source }
    }

    /// 合同执行汇总
    pub async fn contract_summary(&self, contract_no: i64, part_code: &str) -> ApiResult<ContractSummary> {
        if part_code.contains('\0') {
            return Err(ApiError::ValidationError("part_code 含有非法字符".to_string()));
        }

        let key = ContractKey::new(contract_no, part_code);
        let summary = self
            .source
            .contract_summary(&key)
            .await
            .context(|| format!("合同汇总失败 ({})", key))?;

        tracing::debug!(
            key = %key,
            total_delivered = summary.total_delivered,
            has_price = summary.contract_price.is_some(),
            "合同汇总完成"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;

    struct FixedSource;

    #[async_trait]
    impl ContractSummarySource for FixedSource {
        async fn contract_summary(&self, key: &ContractKey) -> RepositoryResult<ContractSummary> {
            if key.part_code == "BROKEN" {
                return Err(RepositoryError::DatabaseQueryError("boom".to_string()));
            }
            Ok(ContractSummary {
                contract_no: key.contract_no,
                part_code: key.part_code.clone(),
                total_delivered: 42.0,
                contract_price: Some(150.0),
            })
        }
    }

    #[tokio::test]
    async fn test_summary_passes_key_through() {
        let api = ProcedureApi::with_source(Arc::new(FixedSource));
        let summary = api.contract_summary(7, "A-1").await.unwrap();
        assert_eq!(summary.contract_no, 7);
        assert_eq!(summary.part_code, "A-1");
        assert_eq!(summary.total_delivered, 42.0);
    }

    #[tokio::test]
    async fn test_summary_passes_blank_part_code_through() {
        let api = ProcedureApi::with_source(Arc::new(FixedSource));
        for part_code in ["", "   "] {
            let summary = api.contract_summary(7, part_code).await.unwrap();
            assert_eq!(summary.part_code, part_code);
        }
    }

    #[tokio::test]
    async fn test_summary_rejects_nul_part_code() {
        let api = ProcedureApi::with_source(Arc::new(FixedSource));
        let err = api.contract_summary(7, "A\0B").await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_summary_storage_error_has_context() {
        let api = ProcedureApi::with_source(Arc::new(FixedSource));
        match api.contract_summary(7, "BROKEN").await.unwrap_err() {
            ApiError::StorageError { context, .. } => assert!(context.contains("BROKEN")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
